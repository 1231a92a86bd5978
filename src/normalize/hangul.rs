//! Character classes used by the merge rules.

/// Korean postpositions that extraction commonly splits from their stem
/// with a stray space. Longest first so `에서` wins over `에`.
pub const POSTPOSITIONS: &[&str] = &[
    "에서", "부터", "까지", "으로", "이", "가", "을", "를", "은", "는", "와", "과", "의", "에",
    "도", "만", "로",
];

/// Hangul syllable or compatibility jamo.
#[must_use]
pub fn is_hangul(c: char) -> bool {
    matches!(c, '가'..='힣' | 'ㄱ'..='ㅎ' | 'ㅏ'..='ㅣ')
}

#[must_use]
pub fn is_sentence_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Word boundary: whitespace or punctuation.
#[must_use]
pub fn is_boundary(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(
            c,
            '“' | '”' | '‘' | '’' | '…' | '·' | '「' | '」' | '『' | '』' | '《' | '》' | '〈'
                | '〉' | '。' | '、'
        )
}

/// PDF fonts map bullets and dingbats into this private-use block.
#[must_use]
pub fn is_pdf_marker(c: char) -> bool {
    matches!(c, '\u{f000}'..='\u{f0ff}')
}

/// Match a postposition at the start of `rest` that forms a whole token.
///
/// Returns its length in characters.
#[must_use]
pub fn postposition_at(rest: &[char]) -> Option<usize> {
    POSTPOSITIONS.iter().find_map(|p| {
        let len = p.chars().count();
        if rest.len() < len || !rest.iter().take(len).copied().eq(p.chars()) {
            return None;
        }
        match rest.get(len) {
            None => Some(len),
            Some(&next) if is_boundary(next) => Some(len),
            Some(_) => None,
        }
    })
}

/// Whether the postposition at the start of `rest` belongs to `stem`, the
/// token right before the stray space.
///
/// `이` doubles as a demonstrative ("나는 이 책을"). It only attaches after
/// a closed syllable, and not to a stem that already ends in a postposition.
#[must_use]
pub fn attaches_to(stem: &[char], rest: &[char]) -> bool {
    let Some(len) = postposition_at(rest) else {
        return false;
    };
    let Some(&last) = stem.last() else {
        return false;
    };
    if !is_hangul(last) {
        return false;
    }
    if len == 1 && rest[0] == '이' {
        return has_final_consonant(last) && !ends_with_postposition(stem);
    }
    true
}

/// Syllable with a final consonant (batchim).
fn has_final_consonant(c: char) -> bool {
    matches!(c, '가'..='힣') && (u32::from(c) - u32::from('가')) % 28 != 0
}

fn ends_with_postposition(token: &[char]) -> bool {
    POSTPOSITIONS.iter().any(|p| {
        let len = p.chars().count();
        token.len() > len && token[token.len() - len..].iter().copied().eq(p.chars())
    })
}
