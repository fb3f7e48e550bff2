use core::num::IntErrorKind;
use core::str::FromStr;
use std::path::Path;

use crate::*;

impl Layout {
    /// Parses a board description: a `ROWSxCOLS` header followed by one card per line, row-major.
    ///
    /// Rules are checked in file order and the first violation is reported. Blank lines at the
    /// end of the input are not card lines: running out of cards there is a count mismatch.
    pub fn parse(input: &str) -> core::result::Result<Self, ParseError> {
        let mut lines = input.lines();

        let header = lines.next().ok_or(ParseError::EmptyInput)?;
        let size = parse_dimensions(header)?;
        let expected = mult(size.0, size.1);

        let body: Vec<&str> = lines.collect();
        let end = body
            .iter()
            .rposition(|line| !is_blank(line))
            .map_or(0, |last| last + 1);
        let body = &body[..end];

        let mut cards = Vec::with_capacity((expected as usize).min(body.len()));
        for (index, line) in body.iter().take(expected as usize).enumerate() {
            // header is line 1
            let line_number = index + 2;
            if is_blank(line) {
                return Err(ParseError::MissingCard { line: line_number });
            }
            let card = Card::new(*line).map_err(|_| ParseError::MalformedCard { line: line_number })?;
            cards.push(card);
        }

        let extra = body
            .iter()
            .skip(expected as usize)
            .filter(|line| !is_blank(line))
            .count();
        let found = cards.len() + extra;
        if found != expected as usize {
            return Err(ParseError::CardCountMismatch {
                expected,
                found: found.try_into().unwrap_or(CellCount::MAX),
            });
        }

        let layout = Layout::from_cards(size, cards)?;
        log::debug!("parsed {}x{} board", size.0, size.1);
        Ok(layout)
    }
}

impl FromStr for Layout {
    type Err = ParseError;

    fn from_str(s: &str) -> core::result::Result<Self, ParseError> {
        Self::parse(s)
    }
}

impl Board {
    /// Loads a board from a board file.
    pub fn parse_from_file(path: impl AsRef<Path>) -> core::result::Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let layout = Layout::parse(&content)?;
        log::debug!("loaded board from {}", path.display());
        Ok(Board::new(layout))
    }
}

impl FromStr for Board {
    type Err = ParseError;

    fn from_str(s: &str) -> core::result::Result<Self, ParseError> {
        Layout::parse(s).map(Board::new)
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn parse_dimensions(header: &str) -> core::result::Result<Coord2, ParseError> {
    let malformed = || ParseError::MalformedDimensions(header.to_owned());

    let (rows, cols) = header.split_once('x').ok_or_else(malformed)?;
    let rows = parse_axis(header, rows)?;
    let cols = parse_axis(header, cols)?;

    if rows == 0 || cols == 0 {
        return Err(ParseError::NonPositiveDimensions);
    }
    Ok((rows, cols))
}

fn parse_axis(header: &str, digits: &str) -> core::result::Result<Coord, ParseError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::MalformedDimensions(header.to_owned()));
    }
    digits.parse::<Coord>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => ParseError::DimensionsTooLarge(header.to_owned()),
        _ => ParseError::MalformedDimensions(header.to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn tokens(layout: &Layout) -> Vec<&str> {
        layout.iter().map(Card::as_str).collect()
    }

    #[test]
    fn parses_square_board() {
        let layout = Layout::parse("2x2\nA\nA\nB\nB").unwrap();

        assert_eq!(layout.size(), (2, 2));
        assert_eq!(tokens(&layout), ["A", "A", "B", "B"]);
    }

    #[test]
    fn accepts_crlf_and_trailing_newline() {
        let layout = Layout::parse("1x3\r\n🍎\r\n🍌\r\n🍎\r\n").unwrap();

        assert_eq!(layout.size(), (1, 3));
        assert_eq!(tokens(&layout), ["🍎", "🍌", "🍎"]);
    }

    #[test]
    fn ignores_trailing_blank_lines() {
        assert!(Layout::parse("1x2\nA\nA\n\n\n").is_ok());
    }

    #[test]
    fn empty_input() {
        assert_eq!(Layout::parse(""), Err(ParseError::EmptyInput));
    }

    #[test]
    fn malformed_headers() {
        for header in ["2 x 2", "2x", "x2", "2X2", "-1x2", "+2x2", "2x2x2", "axb", " 2x2"] {
            let input = format!("{header}\nA\nA\nB\nB");
            assert_eq!(
                Layout::parse(&input),
                Err(ParseError::MalformedDimensions(header.to_owned())),
                "{header:?}"
            );
        }
    }

    #[test]
    fn oversized_header() {
        assert_eq!(
            Layout::parse("99999999999x1\nA"),
            Err(ParseError::DimensionsTooLarge("99999999999x1".to_owned()))
        );
    }

    #[test]
    fn non_positive_dimensions() {
        assert_eq!(
            Layout::parse("0x3\nA\nB\nC"),
            Err(ParseError::NonPositiveDimensions)
        );
        assert_eq!(Layout::parse("3x0"), Err(ParseError::NonPositiveDimensions));
    }

    #[test]
    fn blank_card_line_is_missing_card() {
        assert_eq!(
            Layout::parse("2x2\nA\n\nB\nB"),
            Err(ParseError::MissingCard { line: 3 })
        );
        assert_eq!(
            Layout::parse("1x2\n   \nA\n"),
            Err(ParseError::MissingCard { line: 2 })
        );
    }

    #[test]
    fn trailing_blank_lines_do_not_stand_in_for_cards() {
        let short = Err(ParseError::CardCountMismatch {
            expected: 2,
            found: 1,
        });

        assert_eq!(Layout::parse("1x2\nA\n"), short);
        assert_eq!(Layout::parse("1x2\nA\n\n"), short);
        assert_eq!(Layout::parse("1x2\nA\n   \n\n"), short);
    }

    #[test]
    fn whitespace_in_card_is_malformed() {
        assert_eq!(
            Layout::parse("1x2\nA\nB B"),
            Err(ParseError::MalformedCard { line: 3 })
        );
        assert_eq!(
            Layout::parse("1x2\n A\nB"),
            Err(ParseError::MalformedCard { line: 2 })
        );
    }

    #[test]
    fn too_few_cards() {
        assert_eq!(
            Layout::parse("2x2\nA\nB\nC"),
            Err(ParseError::CardCountMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn too_many_cards() {
        assert_eq!(
            Layout::parse("1x2\nA\nA\nB\n"),
            Err(ParseError::CardCountMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn first_violation_wins() {
        assert_eq!(
            Layout::parse("1x3\nA B\n\nC"),
            Err(ParseError::MalformedCard { line: 2 })
        );
    }

    #[test]
    fn board_from_str_starts_face_down() {
        let board: Board = "2x2\nA\nA\nB\nB".parse().unwrap();

        assert_eq!(board.size(), (2, 2));
        let snapshot = board.snapshot();
        assert!(snapshot.iter().all(|cell| cell.visibility() == Visibility::FaceDown));
    }

    #[test]
    fn rejected_input_builds_no_board() {
        assert!("2x2\nA\nB\nC".parse::<Board>().is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.txt");
        std::fs::write(&path, "1x2\nA\nA\n").unwrap();

        let board = Board::parse_from_file(&path).unwrap();

        assert_eq!(board.size(), (1, 2));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"2x2\nA\nB\nC\n").unwrap();

        let err = Board::parse_from_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse(ParseError::CardCountMismatch {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Board::parse_from_file("/nonexistent/scramble/board.txt").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
