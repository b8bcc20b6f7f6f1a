use crate::tictactoe::board::{Board, CellIndex};
use rand::prelude::IteratorRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub trait MoveRng {
    fn choose<T, I: Iterator<Item = T> + Sized>(&mut self, iter: I) -> Option<T>;
}

#[derive(Debug)]
pub struct BotRng {
    rng: StdRng,
}

impl Default for BotRng {
    fn default() -> Self {
        BotRng {
            rng: StdRng::from_entropy(),
        }
    }
}

impl MoveRng for BotRng {
    fn choose<T, I: Iterator<Item = T> + Sized>(&mut self, iter: I) -> Option<T> {
        iter.choose(&mut self.rng)
    }
}

// Uniformly random among the empty cells. None on a full board.
pub fn choose_move<R: MoveRng>(board: &Board, rng: &mut R) -> Option<CellIndex> {
    rng.choose(board.empty_cells())
}
