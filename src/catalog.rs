use std::fmt;

/// Identifier of a book in the canon, 1..=66.
pub type BookId = u32;

pub const BOOK_COUNT: BookId = 66;

/// Canonical book titles in canon order. Index 0 is book 1 (Genesis).
const BOOK_NAMES: [&str; BOOK_COUNT as usize] = [
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "1 Samuel",
    "2 Samuel",
    "1 Kings",
    "2 Kings",
    "1 Chronicles",
    "2 Chronicles",
    "Ezra",
    "Nehemiah",
    "Esther",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "Song of Solomon",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "1 Corinthians",
    "2 Corinthians",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "1 Thessalonians",
    "2 Thessalonians",
    "1 Timothy",
    "2 Timothy",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "1 Peter",
    "2 Peter",
    "1 John",
    "2 John",
    "3 John",
    "Jude",
    "Revelation",
];

/// A book id outside 1..=66 was passed to a catalog lookup. This is a
/// programming error, not something normal UI paths can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange(pub BookId);

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "book id {} is outside the canon (1..={})", self.0, BOOK_COUNT)
    }
}

impl std::error::Error for OutOfRange {}

/// Canonical title of a book.
pub fn name(id: BookId) -> Result<&'static str, OutOfRange> {
    if (1..=BOOK_COUNT).contains(&id) {
        Ok(BOOK_NAMES[(id - 1) as usize])
    } else {
        Err(OutOfRange(id))
    }
}

/// All 66 books in canon order.
pub fn books() -> impl Iterator<Item = (BookId, &'static str)> {
    BOOK_NAMES
        .iter()
        .enumerate()
        .map(|(i, &name)| (i as BookId + 1, name))
}

/// Books whose title contains `query`, compared with lowercasing and all
/// whitespace removed on both sides, so "1john" finds "1 John". An empty
/// query matches every book. Canon order is preserved.
pub fn filter(query: &str) -> Vec<(BookId, &'static str)> {
    let needle = normalize(query);
    books()
        .filter(|(_, name)| normalize(name).contains(&needle))
        .collect()
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}
