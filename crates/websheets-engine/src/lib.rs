//! websheets_engine - Spreadsheet formula engine + Rhai integration.

pub mod builtins;
pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;

    fn seeded(cells: &[(usize, usize, &str)]) -> Grid {
        let mut grid = Grid::default();
        for (row, col, raw) in cells {
            assert!(grid.set(*row, *col, *raw));
        }
        grid
    }

    fn show(grid: &Grid, row: usize, col: usize) -> String {
        let registry = FunctionRegistry::new();
        Evaluator::new(grid, &registry)
            .evaluate_cell(&CellRef::new(row, col))
            .display()
    }

    #[test]
    fn test_default_grid_dimensions() {
        let grid = Grid::default();
        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.headers(), ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_non_formula_content_is_identity() {
        let grid = Grid::default();
        let registry = FunctionRegistry::new();
        let evaluator = Evaluator::new(&grid, &registry);
        for raw in ["", "plain", "12", "sum(1,2)", " =A1", "LLM(\"a\", \"b\")"] {
            assert_eq!(evaluator.display(raw, &CellRef::new(4, 4)), raw);
        }
    }

    #[test]
    fn test_reference_resolution() {
        let grid = seeded(&[(0, 0, "5"), (0, 1, "=A1+3")]);
        assert_eq!(show(&grid, 0, 1), "8");
    }

    #[test]
    fn test_mutual_references_terminate() {
        let grid = seeded(&[(0, 0, "=B1"), (0, 1, "=A1")]);
        assert_eq!(show(&grid, 0, 0), "#REF!");
        assert_eq!(show(&grid, 0, 1), "#REF!");
    }

    #[test]
    fn test_long_chain_is_bounded() {
        let mut grid = Grid::new(MAX_REFERENCE_DEPTH + 10, 1);
        grid.set(0, 0, "1");
        for row in 1..grid.rows() {
            grid.set(row, 0, format!("=A{}+1", row));
        }
        assert_eq!(show(&grid, 10, 0), "11");
        assert_eq!(show(&grid, grid.rows() - 1, 0), "#REF!");
    }

    #[test]
    fn test_out_of_range_reference() {
        let grid = seeded(&[(0, 1, "=Z99")]);
        assert_eq!(show(&grid, 0, 1), "#REF!");
    }

    #[test]
    fn test_formatting_twice_nests() {
        let once = Wrapper::Bold.apply("x");
        assert_eq!(Wrapper::Bold.apply(&once), "bold(bold(x))");
    }

    #[test]
    fn test_errors_are_sentinels() {
        let grid = seeded(&[
            (0, 0, "=1 +* 2"),
            (1, 0, "=nosuch(1)"),
            (2, 0, "=sqrt(1, 2)"),
            (3, 0, "=LLM(1, 2, 3)"),
            (4, 0, "=exp(1000)"),
            (5, 0, "=sqrt(-1)"),
        ]);
        assert_eq!(show(&grid, 0, 0), "#ERROR!");
        assert_eq!(show(&grid, 1, 0), "#ERROR!");
        assert_eq!(show(&grid, 2, 0), "#ERROR: Invalid sqrt arguments");
        assert_eq!(show(&grid, 3, 0), "#ERROR: Invalid LLM arguments");
        assert_eq!(show(&grid, 4, 0), "#INF!");
        assert_eq!(show(&grid, 5, 0), "#NAN!");
    }

    #[test]
    fn test_references_follow_header_labels() {
        let mut grid = seeded(&[(0, 2, "7"), (0, 3, "=C1*2")]);
        assert_eq!(grid.delete_column(1), Some("B".to_string()));
        // C1 still names the column labelled C, now at index 1.
        assert_eq!(show(&grid, 0, 2), "14");
        // There is no column labelled B any more.
        grid.set(0, 0, "=B1");
        assert_eq!(show(&grid, 0, 0), "#REF!");
    }

    #[test]
    fn test_range_functions() {
        let grid = seeded(&[
            (0, 0, "1"),
            (1, 0, "2"),
            (2, 0, "3"),
            (3, 0, "=sum(A1:A3)"),
            (4, 0, "=mean(A1:A3) ^ 2"),
        ]);
        assert_eq!(show(&grid, 3, 0), "6");
        assert_eq!(show(&grid, 4, 0), "4");
    }

    #[test]
    fn test_variadic_functions_take_any_argument_count() {
        let grid = seeded(&[
            (0, 0, "1"),
            (1, 0, "2"),
            (0, 1, "=sum(1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12)"),
            (1, 1, "=max(A1:A2, 3, 4, 5, 6, 7, 8, 9, 10, -1)"),
            (2, 1, "=count(A1:A2, 1, 2, 3, 4, 5, 6, 7, 8, 9)"),
            (3, 1, "=sum()"),
        ]);
        assert_eq!(show(&grid, 0, 1), "78");
        assert_eq!(show(&grid, 1, 1), "10");
        assert_eq!(show(&grid, 2, 1), "11");
        assert_eq!(show(&grid, 3, 1), "0");
    }

    #[test]
    fn test_negative_reference_substitution() {
        let grid = seeded(&[(0, 0, "-4"), (0, 1, "=A1^2"), (0, 2, "=-A1")]);
        assert_eq!(show(&grid, 0, 1), "16");
        assert_eq!(show(&grid, 0, 2), "4");
    }
}
