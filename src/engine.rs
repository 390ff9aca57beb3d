// The spell-checking engine: ingest, lookup, compound split, suggestion
// generation. Owns the dictionary files, the GoodWordSet, the
// ReducedIndex, and the transcriber; no method is reentrant and a single
// instance is not meant to be shared across threads (see the module docs
// in `lib.rs`).

use crate::codec::{cp_to_utf8, utf8_to_cp};
use crate::error::{EngineError, OverflowKind, Result};
use crate::good_word_set::GoodWordSet;
use crate::locator::Locator;
use crate::reduce::reduce;
use crate::reduced_index::ReducedIndex;
use crate::transcriber::{Rule, Transcriber};
use crate::unicode::{is_combining, to_final, un_precompose};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::Path;

/// How many dictionary file slots exist: 1 (primary) + 5 (supplemental) + 1
/// (runtime-accepted scratch). Slot 0 is reserved and never used.
const NUM_DICT_FILES: usize = 7;
const MAX_SUPPLEMENTAL_SLOT: u8 = 6;
const MAX_DISTANCE: i32 = 3;
const SPREAD: isize = 2;
const MAX_SUGGESTIONS: usize = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineFlags(u8);

impl EngineFlags {
    pub const EXPAND_PRECOMPOSED: EngineFlags = EngineFlags(1 << 0);
    pub const UPPER_LOWER: EngineFlags = EngineFlags(1 << 1);
    pub const HAS_COMPOUNDS: EngineFlags = EngineFlags(1 << 2);
    pub const HAS_COMPOSITION: EngineFlags = EngineFlags(1 << 3);

    pub fn empty() -> Self {
        EngineFlags(0)
    }

    pub fn contains(&self, other: EngineFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for EngineFlags {
    type Output = EngineFlags;
    fn bitor(self, rhs: EngineFlags) -> EngineFlags {
        EngineFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EngineFlags {
    fn bitor_assign(&mut self, rhs: EngineFlags) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, Copy)]
struct Suggestion {
    locator: Locator,
    goodness: i32,
}

pub struct Engine {
    flags: EngineFlags,
    good_words: GoodWordSet,
    reduced_index: ReducedIndex,
    transcriber: Transcriber,
    files: Vec<Option<File>>, // index 0 unused; 1..=7 per NUM_DICT_FILES
    next_file_index: u8,
}

impl Engine {
    /// Construct an engine from a primary dictionary file and an optional
    /// transcription file. The primary dictionary's byte length determines
    /// the size of the GoodWordSet and ReducedIndex (the smallest power of
    /// two at least that large).
    pub fn new(primary: &Path, transcription: Option<&Path>, flags: EngineFlags) -> Result<Engine> {
        let meta = fs::metadata(primary).map_err(|_| EngineError::NoSuchFile {
            path: primary.to_path_buf(),
        })?;
        let table_len = smallest_power_of_two_at_least(meta.len());
        debug!("table length: {} entries", table_len);

        let transcriber = match transcription {
            Some(path) => Transcriber::build(parse_transcription_file(path)?),
            None => Transcriber::empty(),
        };

        let mut files: Vec<Option<File>> = Vec::with_capacity(NUM_DICT_FILES + 1);
        for _ in 0..=NUM_DICT_FILES {
            files.push(None);
        }

        let mut engine = Engine {
            flags,
            good_words: GoodWordSet::new(table_len),
            reduced_index: ReducedIndex::new(table_len),
            transcriber,
            files,
            next_file_index: 0,
        };
        engine.assimilate(primary)?;
        Ok(engine)
    }

    /// Incorporate another dictionary file, such as a personal word list.
    /// Fails once file slot 6 is already occupied (5 supplemental files
    /// plus the primary already loaded at slot 1).
    pub fn assimilate(&mut self, path: &Path) -> Result<()> {
        if self.next_file_index >= MAX_SUPPLEMENTAL_SLOT {
            return Err(EngineError::TooManyDictionaries);
        }
        self.next_file_index += 1;
        let file_index = self.next_file_index;

        let bytes = fs::read(path).map_err(|_| EngineError::NoSuchFile {
            path: path.to_path_buf(),
        })?;
        let file = File::open(path).map_err(|_| EngineError::NoSuchFile {
            path: path.to_path_buf(),
        })?;
        self.files[file_index as usize] = Some(file);

        let mut count = 0usize;
        for (offset, line) in split_lines(&bytes) {
            if line.is_empty() {
                continue;
            }
            let cps = utf8_to_cp(line);
            self.accept_good_word(&cps, offset, file_index)?;
            count += 1;
        }
        debug!("assimilated {} words into file slot {}", count, file_index);
        Ok(())
    }

    /// `string` is taken as correctly spelled but is never offered as a
    /// suggestion (it is added to the GoodWordSet only, not the
    /// ReducedIndex).
    pub fn ignore_word(&mut self, cps: &[u32]) {
        let cps = self.maybe_expand(cps);
        self.good_words.insert(&cps);
    }

    pub fn ignore_word_utf8(&mut self, bytes: &[u8]) {
        self.ignore_word(&utf8_to_cp(bytes));
    }

    /// `bytes` is taken as correctly spelled and becomes eligible as a
    /// suggestion; it is appended to an unlinked scratch file (file slot
    /// 7), created lazily on first use.
    pub fn accept_word(&mut self, bytes: &[u8]) -> Result<()> {
        if self.files[7].is_none() {
            let f = tempfile::tempfile().map_err(|_| EngineError::FileOpen)?;
            self.files[7] = Some(f);
        }
        let offset = {
            let file = self.files[7].as_mut().unwrap();
            let offset = file.seek(SeekFrom::End(0))? as u32;
            file.write_all(bytes)?;
            file.write_all(b"\n")?;
            offset
        };
        let cps = utf8_to_cp(bytes);
        self.accept_good_word(&cps, offset, 7)
    }

    pub fn is_spelled_right(&self, cps: &[u32]) -> bool {
        self.good_words.contains(cps)
    }

    /// Returns 0 if `cps` is not spelled right and cannot be split into two
    /// known words; otherwise the length of the first half. `cps` is
    /// restored to its original contents before returning, on every exit
    /// path (see the final-form handling below).
    pub fn is_spelled_right_multiple(&self, cps: &mut [u32]) -> u32 {
        let len = cps.len();
        if self.is_spelled_right(cps) {
            return len as u32;
        }
        if len < 2 {
            return 0;
        }
        let mut final_index: Option<usize> = None;
        let mut original = 0u32;
        for divide in 1..(len - 1) {
            let last_char = cps[divide - 1];
            let final_form = to_final(last_char);
            if final_form != last_char {
                final_index = Some(divide - 1);
                original = last_char;
                cps[divide - 1] = final_form;
            } else if !is_combining(last_char) {
                if let Some(fi) = final_index {
                    cps[fi] = original;
                    final_index = None;
                }
            }
            if self.is_spelled_right(&cps[..divide]) && self.is_spelled_right(&cps[divide..]) {
                if let Some(fi) = final_index {
                    cps[fi] = original;
                }
                return divide as u32;
            }
        }
        if let Some(fi) = final_index {
            cps[fi] = original;
        }
        0
    }

    /// `probe` is misspelled; return up to `max` plausible corrections,
    /// each a freshly decoded UTF-8 word drawn from the dictionaries.
    pub fn show_alternatives(&mut self, probe: &[u32], max: usize) -> Result<Vec<Vec<u8>>> {
        if self.good_words.contains(probe) {
            return Ok(Vec::new());
        }
        let r = reduce(probe, &self.transcriber);
        let mut suggestions: Vec<Suggestion> = Vec::new();

        self.add_matches(&r, &r, &mut suggestions)?;

        for i in 0..r.len() {
            let omitted = omit_at(&r, i);
            self.add_matches(&omitted, &r, &mut suggestions)?;
        }

        for i in 1..r.len() {
            let mut swapped = r.clone();
            swapped.swap(i - 1, i);
            self.add_matches(&swapped, &r, &mut suggestions)?;
        }

        let take = suggestions.len().min(max);
        let mut out = Vec::with_capacity(take);
        for s in &suggestions[..take] {
            match self.read_word_at(s.locator) {
                Ok(word) => out.push(cp_to_utf8(&word)),
                Err(e) => warn!("could not re-read suggestion word: {}", e),
            }
        }
        Ok(out)
    }

    fn add_matches(
        &mut self,
        probe_r: &[u32],
        target_r: &[u32],
        suggestions: &mut Vec<Suggestion>,
    ) -> Result<()> {
        let mut hits = Vec::new();
        self.reduced_index.lookup_all(probe_r, |loc| hits.push(loc));
        for locator in hits {
            let word = match self.read_word_at(locator) {
                Ok(w) => w,
                Err(e) => {
                    warn!("could not read dictionary entry at {:?}: {}", locator, e);
                    continue;
                }
            };
            let reduced = reduce(&word, &self.transcriber);
            let goodness = word_diff(&reduced, target_r);
            add_suggestion(suggestions, locator, goodness)?;
        }
        Ok(())
    }

    fn accept_good_word(&mut self, cps: &[u32], offset: u32, file_index: u8) -> Result<()> {
        let cps = self.maybe_expand(cps);
        if self.good_words.contains(&cps) {
            return Ok(()); // already known
        }
        self.good_words.insert(&cps);
        let r = reduce(&cps, &self.transcriber);
        let locator = Locator::new(file_index, offset);
        self.reduced_index.insert(&r, locator)?;
        for i in 0..r.len() {
            let omitted = omit_at(&r, i);
            self.reduced_index.insert(&omitted, locator)?;
        }
        Ok(())
    }

    fn maybe_expand(&self, cps: &[u32]) -> Vec<u32> {
        if self.flags.contains(EngineFlags::EXPAND_PRECOMPOSED) {
            un_precompose(cps)
        } else {
            cps.to_vec()
        }
    }

    fn read_word_at(&mut self, locator: Locator) -> Result<Vec<u32>> {
        let file = self.files[locator.file_index as usize]
            .as_mut()
            .ok_or(EngineError::FileOpen)?;
        file.seek(SeekFrom::Start(locator.offset as u64))?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        reader.read_until(b'\n', &mut buf)?;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(utf8_to_cp(&buf))
    }
}

/// The GoodWordSet packs its bitmap 32 bits to a word, so the table must be
/// at least that large regardless of how small the dictionary is.
const MIN_TABLE_LEN: u32 = 32;

fn smallest_power_of_two_at_least(n: u64) -> u32 {
    let mut table_len: u32 = 1;
    let mut remaining = n;
    while remaining > 0 {
        table_len <<= 1;
        remaining >>= 1;
    }
    table_len.max(MIN_TABLE_LEN)
}

fn omit_at(cps: &[u32], index: usize) -> Vec<u32> {
    cps.iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, v)| *v)
        .collect()
}

fn split_lines(bytes: &[u8]) -> Vec<(u32, &[u8])> {
    let mut out = Vec::new();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            out.push((start as u32, &bytes[start..i]));
            start = i + 1;
        }
    }
    out
}

fn parse_transcription_file(path: &Path) -> Result<Vec<Rule>> {
    let text = fs::read_to_string(path).map_err(|_| EngineError::NoSuchFile {
        path: path.to_path_buf(),
    })?;
    let mut rules = Vec::new();
    for line in text.split('\n') {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.rfind(' ') {
            Some(pos) => {
                let (left, right) = (&line[..pos], &line[pos + 1..]);
                rules.push(Rule {
                    left: utf8_to_cp(left.as_bytes()),
                    right: utf8_to_cp(right.as_bytes()),
                });
            }
            None => warn!("skipping malformed transcription line (no separator): {:?}", line),
        }
    }
    Ok(rules)
}

/// A positional symmetric difference, not true edit distance: rewards
/// order-preserving near-matches with small local transpositions. Each
/// side searches for its characters in the other within a window of
/// `SPREAD` positions.
fn word_diff(a: &[u32], b: &[u32]) -> i32 {
    let mut answer = 0i32;
    answer += count_misses(a, b);
    answer += count_misses(b, a);
    answer
}

fn count_misses(search: &[u32], against: &[u32]) -> i32 {
    let mut scratch = against.to_vec();
    let mut misses = 0i32;
    for (i, &cp) in search.iter().enumerate() {
        let mut found = false;
        let i = i as isize;
        for j in (i - SPREAD)..=(i + SPREAD) {
            if j < 0 {
                continue;
            }
            let j = j as usize;
            if j >= scratch.len() {
                continue;
            }
            if scratch[j] == cp {
                scratch[j] = 0;
                found = true;
                break;
            }
        }
        if !found {
            misses += 1;
        }
    }
    misses
}

fn add_suggestion(suggestions: &mut Vec<Suggestion>, locator: Locator, goodness: i32) -> Result<()> {
    if goodness > MAX_DISTANCE {
        return Ok(());
    }
    let mut index = 0;
    while index < suggestions.len() && goodness >= suggestions[index].goodness {
        if suggestions[index].locator == locator {
            if suggestions[index].goodness > goodness {
                suggestions[index].goodness = goodness;
            }
            return Ok(());
        }
        index += 1;
    }
    if suggestions.len() >= MAX_SUGGESTIONS {
        return Err(EngineError::TableOverflow(OverflowKind::SuggestionBuffer));
    }
    suggestions.insert(index, Suggestion { locator, goodness });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn dict_file(words: &[&str]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        for w in words {
            writeln!(f, "{}", w).unwrap();
        }
        f.flush().unwrap();
        f
    }

    fn cps(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn scenario_a_basic_suggestion() {
        let dict = dict_file(&["hello", "world"]);
        let mut engine = Engine::new(dict.path(), None, EngineFlags::empty()).unwrap();
        assert!(engine.is_spelled_right(&cps("hello")));
        assert!(!engine.is_spelled_right(&cps("wrld")));
        let alts = engine.show_alternatives(&cps("wrld"), 4).unwrap();
        let alts: Vec<String> = alts
            .iter()
            .map(|b| String::from_utf8(b.clone()).unwrap())
            .collect();
        assert!(alts.contains(&"world".to_string()), "alts = {:?}", alts);
    }

    #[test]
    fn scenario_b_precomposed_and_decomposed_match() {
        let dict = dict_file(&["caf\u{00e9}"]);
        let mut engine =
            Engine::new(dict.path(), None, EngineFlags::EXPAND_PRECOMPOSED).unwrap();
        // the dictionary entry itself was decomposed at ingestion, so the
        // raw precomposed spelling does not match directly...
        assert!(!engine.is_spelled_right(&cps("caf\u{00e9}")));
        // ...only after the same decomposition is applied to the query,
        // which is the driver's job, not the engine's.
        assert!(engine.is_spelled_right(&un_precompose(&cps("caf\u{00e9}"))));
        let decomposed = vec![0x63, 0x61, 0x66, 0x65, 0x0301];
        assert!(engine.is_spelled_right(&decomposed));
        // plain "cafe" (no accent) should not match directly...
        assert!(!engine.is_spelled_right(&cps("cafe")));
        // ...but should turn up as a suggestion.
        let alts = engine.show_alternatives(&cps("cafe"), 4).unwrap();
        let alts: Vec<String> = alts
            .iter()
            .map(|b| String::from_utf8(b.clone()).unwrap())
            .collect();
        assert!(alts.iter().any(|a| a.contains('\u{00e9}')), "alts = {:?}", alts);
    }

    #[test]
    fn scenario_c_accent_insensitive_suggestion() {
        let dict = dict_file(&["ma\u{00f1}ana"]);
        let mut engine =
            Engine::new(dict.path(), None, EngineFlags::EXPAND_PRECOMPOSED).unwrap();
        assert!(!engine.is_spelled_right(&cps("manana")));
        let alts = engine.show_alternatives(&cps("manana"), 4).unwrap();
        let alts: Vec<String> = alts
            .iter()
            .map(|b| String::from_utf8(b.clone()).unwrap())
            .collect();
        assert!(alts.contains(&"ma\u{00f1}ana".to_string()), "alts = {:?}", alts);
    }

    #[test]
    fn scenario_d_transcription_rule() {
        let dict = dict_file(&["fone"]);
        let mut rules = NamedTempFile::new().unwrap();
        writeln!(rules, "ph f").unwrap();
        rules.flush().unwrap();
        let mut engine =
            Engine::new(dict.path(), Some(rules.path()), EngineFlags::empty()).unwrap();
        assert!(!engine.is_spelled_right(&cps("phone")));
        let alts = engine.show_alternatives(&cps("phone"), 4).unwrap();
        let alts: Vec<String> = alts
            .iter()
            .map(|b| String::from_utf8(b.clone()).unwrap())
            .collect();
        assert!(alts.contains(&"fone".to_string()), "alts = {:?}", alts);
    }

    #[test]
    fn scenario_e_compound_split() {
        let dict = dict_file(&["foot", "ball"]);
        let engine = Engine::new(dict.path(), None, EngineFlags::empty()).unwrap();
        assert!(!engine.is_spelled_right(&cps("football")));
        let mut buf = cps("football");
        let split = engine.is_spelled_right_multiple(&mut buf);
        assert_eq!(split, 4);
        assert_eq!(buf, cps("football")); // unmodified on return
    }

    #[test]
    fn compound_split_returns_zero_and_restores_buffer_on_failure() {
        let dict = dict_file(&["foot", "ball"]);
        let engine = Engine::new(dict.path(), None, EngineFlags::empty()).unwrap();
        let mut buf = cps("unrelated");
        let original = buf.clone();
        let split = engine.is_spelled_right_multiple(&mut buf);
        assert_eq!(split, 0);
        assert_eq!(buf, original);
    }

    #[test]
    fn accept_word_makes_future_lookups_succeed_and_suggestible() {
        let dict = dict_file(&["hello"]);
        let mut engine = Engine::new(dict.path(), None, EngineFlags::empty()).unwrap();
        assert!(!engine.is_spelled_right(&cps("goodbye")));
        engine.accept_word(b"goodbye").unwrap();
        assert!(engine.is_spelled_right(&cps("goodbye")));
    }

    #[test]
    fn duplicate_accept_is_idempotent() {
        let dict = dict_file(&["hello"]);
        let mut engine = Engine::new(dict.path(), None, EngineFlags::empty()).unwrap();
        engine.accept_word(b"goodbye").unwrap();
        let count_after_first = engine.reduced_index.insert_count();
        engine.accept_word(b"goodbye").unwrap();
        assert_eq!(engine.reduced_index.insert_count(), count_after_first);
    }

    #[test]
    fn ignore_word_is_not_suggested() {
        let dict = dict_file(&["hello"]);
        let mut engine = Engine::new(dict.path(), None, EngineFlags::empty()).unwrap();
        engine.ignore_word(&cps("xyzzy"));
        assert!(engine.is_spelled_right(&cps("xyzzy")));
    }

    #[test]
    fn assimilate_supplemental_file() {
        let primary = dict_file(&["hello"]);
        let supplemental = dict_file(&["world"]);
        let mut engine = Engine::new(primary.path(), None, EngineFlags::empty()).unwrap();
        assert!(engine.assimilate(supplemental.path()).is_ok());
        assert!(engine.is_spelled_right(&cps("world")));
    }

    #[test]
    fn missing_primary_dictionary_is_an_error() {
        let result = Engine::new(Path::new("/no/such/file"), None, EngineFlags::empty());
        assert!(matches!(result, Err(EngineError::NoSuchFile { .. })));
    }
}
