// Unicode character properties, treated as pure lookup functions over a
// hard-coded, curated slice of the Unicode Character Database -- this
// package does not ship or parse the UCD itself, it bakes in the tables
// it needs as `lazy_static!` maps, for a "look it up once, cheaply,
// forever" shape without a runtime resource dependency.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    // Canonical decomposition: precomposed letter -> (base, combining marks...).
    // Covers the Latin-1 Supplement accented letters and a handful of other
    // commonly-seen precomposed forms used by the scenarios this package is
    // tested against.
    static ref DECOMPOSITION: HashMap<u32, Vec<u32>> = {
        let mut m = HashMap::new();
        let grave = 0x0300u32;
        let acute = 0x0301u32;
        let circumflex = 0x0302u32;
        let tilde = 0x0303u32;
        let diaeresis = 0x0308u32;
        let ring = 0x030Au32;
        let cedilla = 0x0327u32;
        // (base letter, precomposed code point, combining mark)
        let latin1: &[(u32, u32, u32)] = &[
            (0x41, 0x00C0, grave), (0x41, 0x00C1, acute), (0x41, 0x00C2, circumflex),
            (0x41, 0x00C3, tilde), (0x41, 0x00C4, diaeresis), (0x41, 0x00C5, ring),
            (0x43, 0x00C7, cedilla),
            (0x45, 0x00C8, grave), (0x45, 0x00C9, acute), (0x45, 0x00CA, circumflex),
            (0x45, 0x00CB, diaeresis),
            (0x49, 0x00CC, grave), (0x49, 0x00CD, acute), (0x49, 0x00CE, circumflex),
            (0x49, 0x00CF, diaeresis),
            (0x4E, 0x00D1, tilde),
            (0x4F, 0x00D2, grave), (0x4F, 0x00D3, acute), (0x4F, 0x00D4, circumflex),
            (0x4F, 0x00D5, tilde), (0x4F, 0x00D6, diaeresis),
            (0x55, 0x00D9, grave), (0x55, 0x00DA, acute), (0x55, 0x00DB, circumflex),
            (0x55, 0x00DC, diaeresis),
            (0x59, 0x00DD, acute),
            (0x61, 0x00E0, grave), (0x61, 0x00E1, acute), (0x61, 0x00E2, circumflex),
            (0x61, 0x00E3, tilde), (0x61, 0x00E4, diaeresis), (0x61, 0x00E5, ring),
            (0x63, 0x00E7, cedilla),
            (0x65, 0x00E8, grave), (0x65, 0x00E9, acute), (0x65, 0x00EA, circumflex),
            (0x65, 0x00EB, diaeresis),
            (0x69, 0x00EC, grave), (0x69, 0x00ED, acute), (0x69, 0x00EE, circumflex),
            (0x69, 0x00EF, diaeresis),
            (0x6E, 0x00F1, tilde),
            (0x6F, 0x00F2, grave), (0x6F, 0x00F3, acute), (0x6F, 0x00F4, circumflex),
            (0x6F, 0x00F5, tilde), (0x6F, 0x00F6, diaeresis),
            (0x75, 0x00F9, grave), (0x75, 0x00FA, acute), (0x75, 0x00FB, circumflex),
            (0x75, 0x00FC, diaeresis),
            (0x79, 0x00FD, acute), (0x79, 0x00FF, diaeresis),
        ];
        for &(base, precomposed, mark) in latin1 {
            m.insert(precomposed, vec![base, mark]);
        }
        m
    };

    // Hebrew letters with a distinct word-final glyph: regular -> final.
    static ref FINAL_FORMS: HashMap<u32, u32> = {
        let mut m = HashMap::new();
        m.insert(0x05DB, 0x05DA); // kaf -> final kaf
        m.insert(0x05DE, 0x05DD); // mem -> final mem
        m.insert(0x05E0, 0x05DF); // nun -> final nun
        m.insert(0x05E4, 0x05E3); // pe -> final pe
        m.insert(0x05E6, 0x05E5); // tsadi -> final tsadi
        m
    };

    // Code points whose simple uppercase mapping isn't the regular Latin-1
    // arithmetic offset.
    static ref UPPER_EXCEPTIONS: HashMap<u32, u32> = {
        let mut m = HashMap::new();
        m.insert(0x00FF, 0x0178); // ÿ -> Ÿ
        m.insert(0x00B5, 0x039C); // µ -> Μ
        m
    };
}

/// True for combining marks (accents, diacritics) that modify the preceding
/// base character -- the ranges below cover the blocks actually used by
/// decomposition and reduction in this package.
pub fn is_combining(c: u32) -> bool {
    matches!(c,
        0x0300..=0x036F   // Combining Diacritical Marks
        | 0x1AB0..=0x1AFF // Combining Diacritical Marks Extended
        | 0x1DC0..=0x1DFF // Combining Diacritical Marks Supplement
        | 0x20D0..=0x20FF // Combining Diacritical Marks for Symbols
        | 0xFE20..=0xFE2F // Combining Half Marks
    )
}

/// True for alphabetic code points across the scripts this package is
/// exercised against.
pub fn is_alphabetic(c: u32) -> bool {
    if is_combining(c) {
        return false;
    }
    matches!(c,
        0x0041..=0x005A | 0x0061..=0x007A // ASCII letters
        | 0x00C0..=0x00D6 | 0x00D8..=0x00F6 | 0x00F8..=0x00FF // Latin-1 letters
        | 0x0100..=0x024F // Latin Extended-A/B
        | 0x0370..=0x03FF // Greek
        | 0x0400..=0x04FF // Cyrillic
        | 0x05D0..=0x05EA // Hebrew letters
        | 0x05EF..=0x05F2 // Hebrew Yiddish ligatures
        | 0x0600..=0x06FF // Arabic
        | 0x4E00..=0x9FFF // CJK Unified Ideographs
    )
}

/// Recursively expand precomposed characters into base + combining marks.
/// Code points with no known decomposition pass through unchanged.
pub fn un_precompose(cps: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(cps.len());
    for &cp in cps {
        decompose_into(cp, &mut out);
    }
    out
}

fn decompose_into(cp: u32, out: &mut Vec<u32>) {
    match DECOMPOSITION.get(&cp) {
        Some(parts) => {
            for &part in parts {
                decompose_into(part, out);
            }
        }
        None => out.push(cp),
    }
}

/// Map each code point to its simple uppercase equivalent; identity if none.
pub fn to_upper(cps: &[u32]) -> Vec<u32> {
    cps.iter().map(|&cp| to_upper_one(cp)).collect()
}

fn to_upper_one(cp: u32) -> u32 {
    if let Some(&mapped) = UPPER_EXCEPTIONS.get(&cp) {
        return mapped;
    }
    match cp {
        0x0061..=0x007A => cp - 0x20,                 // ASCII a-z
        0x00E0..=0x00FE if cp != 0x00F7 => cp - 0x20,  // Latin-1 (skip division sign)
        _ => cp,
    }
}

/// Return the word-final form of `c` if one exists, else `c` unchanged.
pub fn to_final(c: u32) -> u32 {
    *FINAL_FORMS.get(&c).unwrap_or(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_combining() {
        assert!(is_combining(0x0301)); // combining acute accent
        assert!(!is_combining(0x0041)); // 'A'
    }

    #[test]
    fn test_is_alphabetic() {
        assert!(is_alphabetic(0x0041));
        assert!(is_alphabetic(0x05DB));
        assert!(!is_alphabetic(0x0020)); // space
        assert!(!is_alphabetic(0x0301)); // combining mark is not alphabetic
    }

    #[test]
    fn test_un_precompose() {
        assert_eq!(un_precompose(&[0x00E9]), vec![0x65, 0x0301]); // é -> e + acute
        assert_eq!(un_precompose(&[0x00F1]), vec![0x6E, 0x0303]); // ñ -> n + tilde
        assert_eq!(un_precompose(&[0x41]), vec![0x41]); // passthrough
    }

    #[test]
    fn test_to_upper() {
        assert_eq!(to_upper(&[0x61, 0x62]), vec![0x41, 0x42]);
        assert_eq!(to_upper(&[0x00E9]), vec![0x00C9]); // é -> É
        assert_eq!(to_upper(&[0x002E]), vec![0x002E]); // '.' unchanged
    }

    #[test]
    fn test_to_final() {
        assert_eq!(to_final(0x05DB), 0x05DA); // kaf -> final kaf
        assert_eq!(to_final(0x05D1), 0x05D1); // bet has no final form
    }
}
