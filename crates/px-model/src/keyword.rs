//! Keyword table for the PX target format.
//!
//! The table is declared in canonical file order: the derived `Ord` on
//! [`Keyword`] is the primary sort key of a rendered file. Each row records
//! whether the keyword may carry a language tag, which qualifiers it takes,
//! and how its value is quoted.
//!
//! ```text
//! Keyword      lang  scope     style
//! CODEPAGE     no    Table     Text
//! STUB         yes   Table     Text
//! VALUES       yes   Variable  Text
//! TIMEVAL      yes   Variable  TimeList
//! VALUENOTE    yes   Cell      Text
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PxError;

/// Which qualifiers an entry for this keyword may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeywordScope {
    /// Table-level only: no variable, no cell.
    Table,
    /// Requires a variable, no cell.
    Variable,
    /// Requires a variable and a cell.
    Cell,
    /// Table-level, variable-level or cell-level.
    Any,
}

impl KeywordScope {
    pub fn requires_variable(self) -> bool {
        matches!(self, Self::Variable | Self::Cell)
    }

    pub fn requires_cell(self) -> bool {
        matches!(self, Self::Cell)
    }

    pub fn allows_variable(self) -> bool {
        !matches!(self, Self::Table)
    }

    pub fn allows_cell(self) -> bool {
        matches!(self, Self::Cell | Self::Any)
    }
}

/// How a keyword's value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueStyle {
    /// Always quoted.
    Text,
    /// Bare `YES`/`NO`; anything else is quoted.
    Boolean,
    /// Bare unsigned integer; anything else is quoted.
    Integer,
    /// Pre-rendered `TLIST(...)` text, written as is.
    TimeList,
}

/// Static description of one keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordSpec {
    pub name: &'static str,
    pub language_dependent: bool,
    pub scope: KeywordScope,
    pub style: ValueStyle,
}

macro_rules! keyword_table {
    ($($variant:ident => $name:literal, $lang:literal, $scope:ident, $style:ident;)+) => {
        /// A target-format keyword. Declaration order is canonical file order.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub enum Keyword {
            $($variant,)+
        }

        impl Keyword {
            /// Every keyword, in canonical order.
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant,)+];

            /// The table row for this keyword.
            pub fn spec(self) -> KeywordSpec {
                match self {
                    $(Keyword::$variant => KeywordSpec {
                        name: $name,
                        language_dependent: $lang,
                        scope: KeywordScope::$scope,
                        style: ValueStyle::$style,
                    },)+
                }
            }
        }
    };
}

keyword_table! {
    Charset => "CHARSET", false, Table, Text;
    AxisVersion => "AXIS-VERSION", false, Table, Text;
    Codepage => "CODEPAGE", false, Table, Text;
    Language => "LANGUAGE", false, Table, Text;
    Languages => "LANGUAGES", false, Table, Text;
    CreationDate => "CREATION-DATE", false, Table, Text;
    NextUpdate => "NEXT-UPDATE", false, Table, Text;
    PxServer => "PX-SERVER", false, Table, Text;
    DirectoryPath => "DIRECTORY-PATH", false, Table, Text;
    UpdateFrequency => "UPDATE-FREQUENCY", false, Table, Text;
    TableId => "TABLEID", false, Table, Text;
    Synonyms => "SYNONYMS", true, Table, Text;
    DefaultGraph => "DEFAULT-GRAPH", false, Table, Integer;
    Decimals => "DECIMALS", false, Table, Integer;
    ShowDecimals => "SHOWDECIMALS", false, Table, Integer;
    Rounding => "ROUNDING", false, Table, Integer;
    Matrix => "MATRIX", false, Table, Text;
    AggregAllowed => "AGGREGALLOWED", false, Table, Boolean;
    Autopen => "AUTOPEN", false, Table, Boolean;
    SubjectCode => "SUBJECT-CODE", false, Table, Text;
    SubjectArea => "SUBJECT-AREA", true, Table, Text;
    Confidential => "CONFIDENTIAL", false, Table, Integer;
    Copyright => "COPYRIGHT", false, Table, Boolean;
    Description => "DESCRIPTION", true, Table, Text;
    Title => "TITLE", true, Table, Text;
    DescriptionDefault => "DESCRIPTIONDEFAULT", false, Table, Boolean;
    Contents => "CONTENTS", true, Table, Text;
    Units => "UNITS", true, Any, Text;
    Stub => "STUB", true, Table, Text;
    Heading => "HEADING", true, Table, Text;
    ContVariable => "CONTVARIABLE", true, Table, Text;
    Values => "VALUES", true, Variable, Text;
    Timeval => "TIMEVAL", true, Variable, TimeList;
    Codes => "CODES", true, Variable, Text;
    DoubleColumn => "DOUBLECOLUMN", true, Variable, Boolean;
    Prestext => "PRESTEXT", true, Variable, Integer;
    Domain => "DOMAIN", true, Variable, Text;
    VariableType => "VARIABLE-TYPE", true, Variable, Text;
    VariableCode => "VARIABLECODE", true, Variable, Text;
    Hierarchies => "HIERARCHIES", true, Variable, Text;
    HierarchyLevels => "HIERARCHYLEVELS", true, Variable, Integer;
    HierarchyLevelsOpen => "HIERARCHYLEVELSOPEN", true, Variable, Integer;
    HierarchyNames => "HIERARCHYNAMES", true, Variable, Text;
    Map => "MAP", true, Variable, Text;
    Partitioned => "PARTITIONED", true, Variable, Text;
    Elimination => "ELIMINATION", true, Variable, Boolean;
    Precision => "PRECISION", true, Cell, Integer;
    LastUpdated => "LAST-UPDATED", true, Any, Text;
    Stockfa => "STOCKFA", true, Any, Text;
    CfPrices => "CFPRICES", true, Any, Text;
    DayAdj => "DAYADJ", true, Any, Boolean;
    SeasAdj => "SEASADJ", true, Any, Boolean;
    Contact => "CONTACT", true, Any, Text;
    RefPeriod => "REFPERIOD", true, Any, Text;
    BasePeriod => "BASEPERIOD", true, Any, Text;
    Database => "DATABASE", true, Table, Text;
    Source => "SOURCE", true, Table, Text;
    Survey => "SURVEY", true, Table, Text;
    Link => "LINK", true, Table, Text;
    InfoFile => "INFOFILE", true, Table, Text;
    FirstPublished => "FIRST-PUBLISHED", false, Table, Text;
    MetaId => "META-ID", false, Any, Text;
    OfficialStatistics => "OFFICIAL-STATISTICS", false, Table, Boolean;
    Info => "INFO", true, Table, Text;
    NoteX => "NOTEX", true, Any, Text;
    Note => "NOTE", true, Any, Text;
    ValueNoteX => "VALUENOTEX", true, Cell, Text;
    ValueNote => "VALUENOTE", true, Cell, Text;
    CellNoteX => "CELLNOTEX", true, Cell, Text;
    CellNote => "CELLNOTE", true, Cell, Text;
    DataSymbol1 => "DATASYMBOL1", true, Table, Text;
    DataSymbol2 => "DATASYMBOL2", true, Table, Text;
    DataSymbol3 => "DATASYMBOL3", true, Table, Text;
    DataSymbol4 => "DATASYMBOL4", true, Table, Text;
    DataSymbol5 => "DATASYMBOL5", true, Table, Text;
    DataSymbol6 => "DATASYMBOL6", true, Table, Text;
    DataSymbolSum => "DATASYMBOLSUM", true, Table, Text;
    DataSymbolNil => "DATASYMBOLNIL", true, Table, Text;
    DataNoteCell => "DATANOTECELL", true, Cell, Text;
    DataNoteSum => "DATANOTESUM", true, Table, Text;
    DataNote => "DATANOTE", true, Any, Text;
    Keys => "KEYS", false, Variable, Text;
    AttributeId => "ATTRIBUTE-ID", false, Table, Text;
    AttributeText => "ATTRIBUTE-TEXT", true, Any, Text;
    Attributes => "ATTRIBUTES", false, Any, Text;
}

impl Keyword {
    /// Upper-case keyword name as written in a file.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn is_language_dependent(self) -> bool {
        self.spec().language_dependent
    }

    pub fn scope(self) -> KeywordScope {
        self.spec().scope
    }

    pub fn style(self) -> ValueStyle {
        self.spec().style
    }

    /// Look up a keyword by name (case-insensitive, surrounding whitespace ignored).
    pub fn lookup(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|keyword| keyword.name().eq_ignore_ascii_case(trimmed))
    }

    /// Check that variable/cell qualifiers fit this keyword.
    pub fn check_scope(self, variable: Option<&str>, cell: Option<&str>) -> Result<(), PxError> {
        let scope = self.scope();
        if variable.is_none() && scope.requires_variable() {
            return Err(PxError::invalid_scope(self.name(), "a variable is required"));
        }
        if variable.is_some() && !scope.allows_variable() {
            return Err(PxError::invalid_scope(
                self.name(),
                "table-level keyword cannot name a variable",
            ));
        }
        if cell.is_some() && variable.is_none() {
            return Err(PxError::invalid_scope(
                self.name(),
                "a cell requires a variable",
            ));
        }
        if cell.is_none() && scope.requires_cell() {
            return Err(PxError::invalid_scope(self.name(), "a cell is required"));
        }
        if cell.is_some() && !scope.allows_cell() {
            return Err(PxError::invalid_scope(
                self.name(),
                "keyword cannot name a cell",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Keyword {
    type Err = PxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| PxError::UnknownKeyword {
            keyword: s.trim().to_string(),
        })
    }
}

impl TryFrom<String> for Keyword {
    type Error = PxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.name().to_string()
    }
}
