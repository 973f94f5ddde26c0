//! Game of Life board, reference rules and board IO

pub mod grid;
pub mod io;
pub mod rules;

pub use grid::{checked_cell_count, is_border, Grid};
pub use io::{
    create_example_boards, grid_to_tokens, load_board_from_file, parse_board_tokens, read_board,
    save_grid_to_file,
};
pub use rules::{GameOfLifeRules, Transition};
