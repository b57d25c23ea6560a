use indexmap::IndexSet;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Defines the `Keyword` enum together with its lexeme table.
///
/// `keyword_def!(Select)` maps the variant to the lexeme `"select"`;
/// `keyword_def!(ServerVersion = "server_version")` overrides the lexeme for
/// keywords whose spelling is not the lower-cased variant name.
macro_rules! define_keywords {
    ($(
        $variant:ident $(= $lexeme:literal)?
    ),* $(,)?) => {
        /// Every word the lexer recognises as a keyword.
        ///
        /// This is *not* the reserved-word list: most of these are
        /// identifier-keywords and may still name tables, columns, users and
        /// groups. See [`is_reserved`] and [`Keyword::is_reserved`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Keyword {
            $($variant),*
        }

        /// All keywords, in declaration order.
        pub const ALL_KEYWORDS: &[Keyword] = &[$(Keyword::$variant),*];

        impl Keyword {
            /// The canonical spelling of this keyword. Matching is always
            /// case-insensitive; multi-word lexemes carry an explicit
            /// override in the table.
            pub const fn lexeme(self) -> &'static str {
                match self {
                    $(Keyword::$variant => define_keywords!(@lex $variant $(= $lexeme)?)),*
                }
            }

            /// The token-kind name reported by content assist, e.g. `"By"`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Keyword::$variant => stringify!($variant)),*
                }
            }
        }
    };
    (@lex $variant:ident = $lexeme:literal) => { $lexeme };
    (@lex $variant:ident) => { stringify!($variant) };
}

define_keywords!(
    Abort,
    Account,
    Accounts,
    Add,
    Align,
    All,
    Alter,
    And,
    Array,
    As,
    Asc,
    Asof,
    Assume,
    Atomic,
    Attach,
    Backup,
    Base,
    Batch,
    Between,
    By,
    Bypass,
    Cache,
    Calendar,
    Cancel,
    Capacity,
    Case,
    Cast,
    Checkpoint,
    Column,
    Columns,
    Compile,
    Complete,
    CompressionCodec = "compression_codec",
    Convert,
    Copy,
    Create,
    Cross,
    Current,
    Database,
    Day,
    Days,
    Declare,
    Dedup,
    Delay,
    Delimiter,
    Desc,
    Detach,
    Disable,
    Distinct,
    Drop,
    Else,
    Enable,
    End,
    Error,
    Every,
    Except,
    Exclude,
    Exclusive,
    Exists,
    Exit,
    Explain,
    False,
    Fill,
    First,
    Following,
    For,
    Format,
    From,
    Full,
    Grant,
    Group,
    Groups,
    Header,
    Hour,
    Hours,
    If,
    Ignore,
    Ilike,
    Immediate,
    In,
    Include,
    Incremental,
    Index,
    Inner,
    Insert,
    Intersect,
    Interval,
    Into,
    Is,
    Join,
    Keys,
    Latest,
    Left,
    Length,
    Like,
    Limit,
    List,
    Lock,
    Lt,
    Manual,
    Materialized,
    Month,
    Months,
    Nan,
    No,
    Nocache,
    None,
    Not,
    Null,
    Nulls,
    Observation,
    Offset,
    On,
    Option,
    Or,
    Order,
    Others,
    Outer,
    Over,
    Owned,
    Param,
    Parameters,
    Partition,
    PartitionBy = "partition_by",
    Partitions,
    Password,
    Period,
    Permissions,
    Pivot,
    Preceding,
    Prepare,
    Prevailing,
    Query,
    Range,
    Refresh,
    Reindex,
    Release,
    Remove,
    Rename,
    Respect,
    Resume,
    Revoke,
    Row,
    Rows,
    Sample,
    Select,
    ServerVersion = "server_version",
    Service,
    Set,
    Show,
    SkipColumn = "skip_column",
    SkipRow = "skip_row",
    Snapshot,
    Splice,
    Squash,
    Start,
    Suspend,
    Symbol,
    Table,
    Tables,
    Then,
    Ties,
    Time,
    Timestamp,
    To,
    Tolerance,
    Transaction,
    True,
    Truncate,
    Ttl,
    Txn,
    Type,
    Unbounded,
    Union,
    Update,
    Upsert,
    User,
    Users,
    Vacuum,
    Values,
    View,
    Volume,
    Wal,
    Week,
    Weeks,
    When,
    Where,
    Window,
    With,
    Within,
    Year,
    Years,
    Zone,
);

/// Reserved keywords: these can never appear where an identifier is
/// expected. Everything in [`ALL_KEYWORDS`] that is *not* listed here is an
/// identifier-keyword and is admitted in identifier positions by the
/// grammar's `IdentLike` non-terminal.
const RESERVED: &[Keyword] = &[
    Keyword::All,
    Keyword::And,
    Keyword::As,
    Keyword::Asof,
    Keyword::Between,
    Keyword::By,
    Keyword::Case,
    Keyword::Cast,
    Keyword::Create,
    Keyword::Cross,
    Keyword::Distinct,
    Keyword::Drop,
    Keyword::Else,
    Keyword::End,
    Keyword::Except,
    Keyword::Exclude,
    Keyword::Explain,
    Keyword::False,
    Keyword::For,
    Keyword::From,
    Keyword::Group,
    Keyword::Ilike,
    Keyword::In,
    Keyword::Include,
    Keyword::Inner,
    Keyword::Insert,
    Keyword::Intersect,
    Keyword::Into,
    Keyword::Is,
    Keyword::Join,
    Keyword::Latest,
    Keyword::Left,
    Keyword::Like,
    Keyword::Limit,
    Keyword::Lt,
    Keyword::Nan,
    Keyword::Not,
    Keyword::Null,
    Keyword::On,
    Keyword::Or,
    Keyword::Order,
    Keyword::Outer,
    Keyword::Over,
    Keyword::Pivot,
    Keyword::Prevailing,
    Keyword::Range,
    Keyword::Rename,
    Keyword::Sample,
    Keyword::Select,
    Keyword::Set,
    Keyword::Show,
    Keyword::Splice,
    Keyword::Table,
    Keyword::To,
    Keyword::Tolerance,
    Keyword::True,
    Keyword::Truncate,
    Keyword::Union,
    Keyword::Update,
    Keyword::Values,
    Keyword::When,
    Keyword::Where,
    Keyword::Window,
    Keyword::With,
    Keyword::Within,
];

/// Literal constants that share the keyword namespace.
const CONSTANTS: &[Keyword] = &[Keyword::True, Keyword::False, Keyword::Null, Keyword::Nan];

static LOOKUP: Lazy<HashMap<String, Keyword>> = Lazy::new(|| {
    ALL_KEYWORDS
        .iter()
        .map(|&kw| (kw.lexeme().to_ascii_lowercase(), kw))
        .collect()
});

static RESERVED_SET: Lazy<IndexSet<Keyword>> = Lazy::new(|| RESERVED.iter().copied().collect());

/// The word set the serializer quotes identifiers against: keywords and
/// constants minus identifier-keywords, case-folded to lower.
static QUOTED_WORDS: Lazy<IndexSet<String>> = Lazy::new(|| {
    RESERVED
        .iter()
        .chain(CONSTANTS.iter())
        .map(|kw| kw.lexeme().to_ascii_lowercase())
        .collect()
});

/// Keywords admissible as identifiers, in declaration order.
pub static IDENTIFIER_KEYWORDS: Lazy<Vec<Keyword>> = Lazy::new(|| {
    ALL_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| !RESERVED_SET.contains(kw))
        .collect()
});

impl Keyword {
    /// Case-insensitive lookup of a lexeme.
    pub fn lookup(word: &str) -> Option<Keyword> {
        LOOKUP.get(&word.to_ascii_lowercase()).copied()
    }

    /// Whether this keyword can never stand in for an identifier.
    pub fn is_reserved(self) -> bool {
        RESERVED_SET.contains(&self)
    }
}

/// Whether `word` (any case) must be quoted when emitted as an identifier.
pub fn is_reserved(word: &str) -> bool {
    QUOTED_WORDS.contains(&word.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_folds_case() {
        assert_eq!(Keyword::lookup("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("Select"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("server_VERSION"), Some(Keyword::ServerVersion));
        assert_eq!(Keyword::lookup("notakeyword"), None);
    }

    #[test]
    fn identifier_keywords_exclude_reserved() {
        assert!(IDENTIFIER_KEYWORDS.contains(&Keyword::Wal));
        assert!(IDENTIFIER_KEYWORDS.contains(&Keyword::Timestamp));
        assert!(!IDENTIFIER_KEYWORDS.contains(&Keyword::Select));
        assert!(!IDENTIFIER_KEYWORDS.contains(&Keyword::From));
    }

    #[test]
    fn quoting_set_covers_constants() {
        assert!(is_reserved("select"));
        assert!(is_reserved("NULL"));
        assert!(is_reserved("NaN"));
        assert!(!is_reserved("wal"));
        assert!(!is_reserved("trades"));
    }
}
