// The "reduced form" projection used for fuzzy lookup: strip precomposition
// and accents, then apply any language-specific transcription.

use crate::transcriber::Transcriber;
use crate::unicode::{is_combining, un_precompose};

/// reduce(w) = transcribe(strip_combining(un_precompose(w)))
pub fn reduce(cps: &[u32], transcriber: &Transcriber) -> Vec<u32> {
    let decomposed = un_precompose(cps);
    let stripped: Vec<u32> = decomposed.into_iter().filter(|cp| !is_combining(*cp)).collect();
    if transcriber.is_empty() {
        stripped
    } else {
        transcriber.apply(&stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_strips_accents() {
        let t = Transcriber::empty();
        // "café" precomposed -> decomposes to c a f e + combining acute, then
        // the accent is stripped.
        let cps = vec![0x63, 0x61, 0x66, 0x00E9];
        assert_eq!(reduce(&cps, &t), vec![0x63, 0x61, 0x66, 0x65]);
    }

    #[test]
    fn test_reduce_applies_transcription() {
        use crate::transcriber::Rule;
        let t = Transcriber::build(vec![Rule {
            left: vec![0x70, 0x68], // "ph"
            right: vec![0x66],      // "f"
        }]);
        let cps: Vec<u32> = "phone".chars().map(|c| c as u32).collect();
        let reduced = reduce(&cps, &t);
        let expected: Vec<u32> = "fone".chars().map(|c| c as u32).collect();
        assert_eq!(reduced, expected);
    }

    #[test]
    fn test_reduce_fixpoint() {
        let t = Transcriber::empty();
        let cps: Vec<u32> = "manana".chars().map(|c| c as u32).collect();
        let once = reduce(&cps, &t);
        let twice = reduce(&once, &t);
        assert_eq!(once, twice);
    }
}
