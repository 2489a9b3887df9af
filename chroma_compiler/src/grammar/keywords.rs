//! Reserved words
//!
//! Declaration keywords, CSS named colors, color function names and dimension
//! unit words. The lookup table is built once and never mutated.
use crate::tokens::TokenKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Declaration keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Const,
    Let,
    Var,
}

impl Keyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Const => "const",
            Self::Let => "let",
            Self::Var => "var",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "const" => Some(Self::Const),
            "let" => Some(Self::Let),
            "var" => Some(Self::Var),
            _ => None,
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a reserved word means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordType {
    Declaration(Keyword),
    NamedColor,
    Function,
    Unit,
    Identifier,
}

impl WordType {
    pub fn token_kind(self) -> TokenKind {
        match self {
            Self::Declaration(_) | Self::NamedColor => TokenKind::Keyword,
            Self::Function => TokenKind::Function,
            Self::Unit => TokenKind::Dimension,
            Self::Identifier => TokenKind::Identifier,
        }
    }
}

pub fn declaration_keywords() -> &'static [&'static str] {
    &["const", "let", "var"]
}

pub fn color_functions() -> &'static [&'static str] {
    &[
        "rgb",
        "rgba",
        "hsl",
        "hsla",
        "hwb",
        "lab",
        "lch",
        "oklab",
        "oklch",
        "color",
        "mix",
        "lighten",
        "darken",
        "saturate",
        "desaturate",
        "alpha",
        "invert",
        "grayscale",
        "complement",
        "tint",
        "shade",
    ]
}

/// Units accepted after a numeric literal
pub fn dimension_units() -> &'static [&'static str] {
    &[
        "deg", "grad", "rad", "turn", "px", "em", "rem", "ex", "ch", "vw", "vh", "vmin", "vmax",
        "cm", "mm", "in", "pt", "pc", "ms", "hz", "khz", "dpi", "dpcm", "dppx",
    ]
}

/// CSS Color Module Level 4 named colors
pub fn named_colors() -> &'static [&'static str] {
    &[
        "aliceblue",
        "antiquewhite",
        "aqua",
        "aquamarine",
        "azure",
        "beige",
        "bisque",
        "black",
        "blanchedalmond",
        "blue",
        "blueviolet",
        "brown",
        "burlywood",
        "cadetblue",
        "chartreuse",
        "chocolate",
        "coral",
        "cornflowerblue",
        "cornsilk",
        "crimson",
        "cyan",
        "darkblue",
        "darkcyan",
        "darkgoldenrod",
        "darkgray",
        "darkgreen",
        "darkgrey",
        "darkkhaki",
        "darkmagenta",
        "darkolivegreen",
        "darkorange",
        "darkorchid",
        "darkred",
        "darksalmon",
        "darkseagreen",
        "darkslateblue",
        "darkslategray",
        "darkslategrey",
        "darkturquoise",
        "darkviolet",
        "deeppink",
        "deepskyblue",
        "dimgray",
        "dimgrey",
        "dodgerblue",
        "firebrick",
        "floralwhite",
        "forestgreen",
        "fuchsia",
        "gainsboro",
        "ghostwhite",
        "gold",
        "goldenrod",
        "gray",
        "green",
        "greenyellow",
        "grey",
        "honeydew",
        "hotpink",
        "indianred",
        "indigo",
        "ivory",
        "khaki",
        "lavender",
        "lavenderblush",
        "lawngreen",
        "lemonchiffon",
        "lightblue",
        "lightcoral",
        "lightcyan",
        "lightgoldenrodyellow",
        "lightgray",
        "lightgreen",
        "lightgrey",
        "lightpink",
        "lightsalmon",
        "lightseagreen",
        "lightskyblue",
        "lightslategray",
        "lightslategrey",
        "lightsteelblue",
        "lightyellow",
        "lime",
        "limegreen",
        "linen",
        "magenta",
        "maroon",
        "mediumaquamarine",
        "mediumblue",
        "mediumorchid",
        "mediumpurple",
        "mediumseagreen",
        "mediumslateblue",
        "mediumspringgreen",
        "mediumturquoise",
        "mediumvioletred",
        "midnightblue",
        "mintcream",
        "mistyrose",
        "moccasin",
        "navajowhite",
        "navy",
        "oldlace",
        "olive",
        "olivedrab",
        "orange",
        "orangered",
        "orchid",
        "palegoldenrod",
        "palegreen",
        "paleturquoise",
        "palevioletred",
        "papayawhip",
        "peachpuff",
        "peru",
        "pink",
        "plum",
        "powderblue",
        "purple",
        "rebeccapurple",
        "red",
        "rosybrown",
        "royalblue",
        "saddlebrown",
        "salmon",
        "sandybrown",
        "seagreen",
        "seashell",
        "sienna",
        "silver",
        "skyblue",
        "slateblue",
        "slategray",
        "slategrey",
        "snow",
        "springgreen",
        "steelblue",
        "tan",
        "teal",
        "thistle",
        "tomato",
        "transparent",
        "turquoise",
        "violet",
        "wheat",
        "white",
        "whitesmoke",
        "yellow",
        "yellowgreen",
    ]
}

fn word_table() -> &'static HashMap<&'static str, WordType> {
    static TABLE: OnceLock<HashMap<&'static str, WordType>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();

        for word in named_colors() {
            table.insert(*word, WordType::NamedColor);
        }
        for word in dimension_units() {
            table.insert(*word, WordType::Unit);
        }
        for word in color_functions() {
            table.insert(*word, WordType::Function);
        }
        for word in declaration_keywords() {
            if let Some(keyword) = Keyword::from_str(word) {
                table.insert(*word, WordType::Declaration(keyword));
            }
        }

        table
    })
}

/// Classify a word; unknown words are plain identifiers. Matching is exact.
pub fn classify_word_type(word: &str) -> WordType {
    word_table()
        .get(word)
        .copied()
        .unwrap_or(WordType::Identifier)
}

/// Token kind an identifier run is retyped to
pub fn classify_word(word: &str) -> TokenKind {
    classify_word_type(word).token_kind()
}

pub fn is_named_color(word: &str) -> bool {
    classify_word_type(word) == WordType::NamedColor
}

pub fn is_dimension_unit(word: &str) -> bool {
    dimension_units().contains(&word)
}
