use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Placeholder SVD uses for the index of a register array member
pub const ARRAY_PLACEHOLDER: &str = "[%s]";

pub const BITS_PER_BYTE: u32 = 8;

/// Removes at most one occurrence of every abbreviation, in list order.
pub fn strip_abbrev<S: AsRef<str>>(text: &str, abbrevs: &[S]) -> String {
    abbrevs
        .iter()
        .fold(text.to_string(), |s, a| s.replacen(a.as_ref(), "", 1))
}

/// Name of a register after abbreviation stripping: lower-cased and never a keyword.
pub fn register_name<S: AsRef<str>>(raw: &str, abbrevs: &[S]) -> String {
    strip_abbrev(&raw.to_lowercase(), abbrevs)
        .to_sanitized_keyword()
        .into_owned()
}

pub trait ToCapitalized {
    /// First character upper, rest lower. A single character is upper-cased.
    fn to_capitalized(&self) -> String;
}

impl ToCapitalized for str {
    fn to_capitalized(&self) -> String {
        let mut chars = self.chars();
        match chars.next() {
            Some(first) if self.chars().count() > 1 => first
                .to_uppercase()
                .chain(chars.as_str().to_lowercase().chars())
                .collect(),
            _ => self.to_uppercase(),
        }
    }
}

pub trait ToSanitizedFieldName {
    /// Drops one leading underscore and prefixes a digit-initial name with `_`
    fn to_sanitized_field_name(&self) -> Cow<'_, str>;
}

impl ToSanitizedFieldName for str {
    fn to_sanitized_field_name(&self) -> Cow<'_, str> {
        let s = self.strip_prefix('_').unwrap_or(self);
        match s.chars().next() {
            Some(c) if c.is_ascii_digit() => Cow::from(format!("_{s}")),
            _ => Cow::from(s),
        }
    }
}

pub trait ToSanitizedKeyword {
    fn to_sanitized_keyword(&self) -> Cow<'_, str>;
}

impl ToSanitizedKeyword for str {
    fn to_sanitized_keyword(&self) -> Cow<'_, str> {
        macro_rules! keywords {
            ($s:expr, $($kw:ident),+,) => {
                Cow::from(match $s {
                    $(stringify!($kw) => concat!(stringify!($kw), "_")),+,
                    _ => return Cow::from($s)
                })
            }
        }

        // `int` registers are interrupt control registers in most vendor files
        if self == "int" {
            return Cow::from("intctl");
        }

        keywords! {
            self,
            auto,
            bool,
            break,
            case,
            char,
            class,
            const,
            continue,
            default,
            delete,
            do,
            double,
            else,
            enum,
            explicit,
            extern,
            false,
            float,
            for,
            friend,
            goto,
            if,
            inline,
            long,
            namespace,
            new,
            operator,
            private,
            protected,
            public,
            register,
            return,
            short,
            signed,
            sizeof,
            static,
            struct,
            switch,
            template,
            this,
            throw,
            true,
            try,
            typedef,
            union,
            unsigned,
            using,
            virtual,
            void,
            volatile,
            while,
        }
    }
}

/// Index of an array member name such as `CTL[3]`.
pub fn array_index(name: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\[(\d+)\]").unwrap());
    re.captures(name).and_then(|c| c[1].parse().ok())
}

/// Replaces the index of an array name (`ctl[%s]` or `ctl[3]`) with `with`.
pub fn array_name(name: &str, with: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    if name.contains(ARRAY_PLACEHOLDER) {
        name.replace(ARRAY_PLACEHOLDER, with)
    } else {
        let re = RE.get_or_init(|| Regex::new(r"\[\d+\]").unwrap());
        re.replace(name, with).into_owned()
    }
}

/// Replaces the `%s` index placeholder of an SVD array name.
pub fn replace_suffix(name: &str, suffix: &str) -> String {
    if name.contains(ARRAY_PLACEHOLDER) {
        name.replace(ARRAY_PLACEHOLDER, &format!("[{suffix}]"))
    } else {
        name.replace("%s", suffix)
    }
}

pub fn respace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn hex(n: u64) -> String {
    format!("0x{n:08X}")
}
