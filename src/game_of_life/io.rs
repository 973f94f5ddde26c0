//! Board input and output
//!
//! The input format is a stream of `length * length` integer tokens separated
//! by whitespace, row-major. A nonzero token marks a live cell.

use super::{checked_cell_count, Grid};
use crate::error::{LifeError, Result};
use anyhow::Context;
use std::io::Read;
use std::path::Path;

/// Parse exactly `length * length` tokens from `content`.
/// Tokens past the last cell are ignored.
pub fn parse_board_tokens(content: &str, length: usize) -> Result<Grid> {
    let expected = checked_cell_count(length)?;
    let mut grid = Grid::new(length);
    let mut tokens = content.split_whitespace();

    for idx in 0..expected {
        let token = tokens.next().ok_or_else(|| {
            LifeError::MalformedBoard(format!(
                "expected {} cell values, input ended after {}",
                expected, idx
            ))
        })?;
        let value: i64 = token.parse().map_err(|_| {
            LifeError::MalformedBoard(format!(
                "invalid token '{}' at row {}, column {}",
                token,
                idx / length,
                idx % length
            ))
        })?;
        grid.cells[idx] = value != 0;
    }

    Ok(grid)
}

/// Read a board of side `length` from any reader (typically stdin)
pub fn read_board<R: Read>(mut reader: R, length: usize) -> anyhow::Result<Grid> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .context("Failed to read board input")?;
    Ok(parse_board_tokens(&content, length)?)
}

/// Load a board from a token file
pub fn load_board_from_file<P: AsRef<Path>>(path: P, length: usize) -> anyhow::Result<Grid> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read board file: {}", path.as_ref().display()))?;

    parse_board_tokens(&content, length)
        .with_context(|| format!("Failed to parse board from file: {}", path.as_ref().display()))
}

/// Convert a grid to the token format, one row per line
pub fn grid_to_tokens(grid: &Grid) -> String {
    let mut result = String::with_capacity(grid.length * (2 * grid.length + 1));

    for row in 0..grid.length {
        for col in 0..grid.length {
            if col > 0 {
                result.push(' ');
            }
            result.push(if grid.get(row, col) { '1' } else { '0' });
        }
        result.push('\n');
    }

    result
}

/// Save a grid in the token format
pub fn save_grid_to_file<P: AsRef<Path>>(grid: &Grid, path: P) -> anyhow::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, grid_to_tokens(grid))
        .with_context(|| format!("Failed to write board to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Write example boards (all of side 5 or 6) for trying the CLI
pub fn create_example_boards<P: AsRef<Path>>(output_dir: P) -> anyhow::Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let examples = [
        ("empty.txt", "0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n"),
        ("block.txt", "0 0 0 0 0\n0 1 1 0 0\n0 1 1 0 0\n0 0 0 0 0\n0 0 0 0 0\n"),
        ("blinker.txt", "0 0 0 0 0\n0 0 0 0 0\n0 1 1 1 0\n0 0 0 0 0\n0 0 0 0 0\n"),
        (
            "glider.txt",
            "0 0 0 0 0 0\n0 0 1 0 0 0\n0 0 0 1 0 0\n0 1 1 1 0 0\n0 0 0 0 0 0\n0 0 0 0 0 0\n",
        ),
    ];

    for (name, content) in examples {
        std::fs::write(dir.join(name), content)
            .with_context(|| format!("Failed to write {}", name))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_board_tokens() {
        let grid = parse_board_tokens("0 1 0\n1 0 1\n0 1 0\n", 3).unwrap();

        assert_eq!(grid.length, 3);
        assert_eq!(grid.living_count(), 4);
        assert!(grid.get(0, 1));
        assert!(grid.get(1, 0));
        assert!(grid.get(1, 2));
        assert!(grid.get(2, 1));
    }

    #[test]
    fn test_any_nonzero_token_activates() {
        let grid = parse_board_tokens("0 7 -1 0", 2).unwrap();
        assert_eq!(grid.values(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_layout_is_free_form() {
        let a = parse_board_tokens("0 1 0 1", 2).unwrap();
        let b = parse_board_tokens("0\n1\n\n0   1\n", 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_extra_tokens_ignored() {
        let grid = parse_board_tokens("1 0 0 1 1 1 1", 2).unwrap();
        assert_eq!(grid.values(), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            parse_board_tokens("0 1 0", 2),
            Err(LifeError::MalformedBoard(_))
        ));
        assert!(matches!(
            parse_board_tokens("0 x 0 1", 2),
            Err(LifeError::MalformedBoard(_))
        ));
        assert!(matches!(
            parse_board_tokens("", 0),
            Err(LifeError::InvalidConfiguration(_))
        ));
        // Rejected before any cell storage is allocated
        assert!(matches!(
            parse_board_tokens("1 0 1", usize::MAX),
            Err(LifeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_grid_to_tokens() {
        let grid = parse_board_tokens("0 1 0 1 0 1 0 1 0", 3).unwrap();
        assert_eq!(grid_to_tokens(&grid), "0 1 0\n1 0 1\n0 1 0\n");
    }

    #[test]
    fn test_read_board_from_reader() {
        let grid = read_board("1 0\n0 1\n".as_bytes(), 2).unwrap();
        assert_eq!(grid.living_cells(), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_file_operations() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("boards/test_board.txt");

        let original = parse_board_tokens("0 0 0 0 1 0 0 0 0", 3).unwrap();
        save_grid_to_file(&original, &file_path).unwrap();
        let loaded = load_board_from_file(&file_path, 3).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_create_example_boards() {
        let temp_dir = tempdir().unwrap();
        create_example_boards(temp_dir.path()).unwrap();

        for name in ["empty.txt", "block.txt", "blinker.txt", "glider.txt"] {
            assert!(temp_dir.path().join(name).exists());
        }

        let blinker = load_board_from_file(temp_dir.path().join("blinker.txt"), 5).unwrap();
        assert_eq!(blinker.living_cells(), vec![(2, 1), (2, 2), (2, 3)]);

        let glider = load_board_from_file(temp_dir.path().join("glider.txt"), 6).unwrap();
        assert_eq!(glider.living_count(), 5);
    }
}
