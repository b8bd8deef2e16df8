use crate::reader::is_break_char;

#[inline]
#[must_use]
pub(crate) fn is_blank(chr: char) -> bool {
    chr == ' ' || chr == '\t'
}

#[inline]
#[must_use]
pub(crate) fn is_break(chr: char) -> bool {
    is_break_char(chr)
}

#[inline]
#[must_use]
pub(crate) fn is_blank_or_break(chr: char) -> bool {
    is_blank(chr) || is_break(chr)
}

#[inline]
#[must_use]
pub(crate) fn is_flow(chr: char) -> bool {
    matches!(chr, ',' | '[' | ']' | '{' | '}')
}

/// Characters that end a plain scalar inside flow collections.
#[inline]
#[must_use]
pub(crate) fn is_flow_break(chr: char) -> bool {
    matches!(chr, '?' | ':' | ',' | '[' | ']' | '{' | '}')
}

#[inline]
#[must_use]
pub(crate) fn is_anchor_char(chr: char) -> bool {
    !chr.is_whitespace() && !is_break(chr) && !is_flow(chr) && chr != '\u{feff}'
}

#[inline]
#[must_use]
pub(crate) fn is_word_char(chr: char) -> bool {
    chr.is_ascii_alphanumeric() || chr == '-' || chr == '_'
}

/// The URL-fragment repertoire plus `# % [ ]`, as verbatim tags allow.
#[inline]
#[must_use]
pub(crate) fn is_uri_char(chr: char) -> bool {
    is_word_char(chr) || "#;/?:@&=+$,.!~*'()[]%".contains(chr)
}

/// Shorthand tag suffixes additionally exclude `! ( ) ,` and the flow
/// indicators.
#[inline]
#[must_use]
pub(crate) fn is_tag_char(chr: char) -> bool {
    is_uri_char(chr) && !matches!(chr, '!' | '(' | ')' | ',' | '[' | ']' | '{' | '}')
}
