use crate::document::NewDocument;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read seed documents from a `.jsonl` file (one object per line) or a JSON
/// file holding either an array of objects or a single object.
///
/// Records need a `content` (or `body`) field and may carry a `url`.
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<NewDocument>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening seed corpus {}", path.display()))?;
    let reader = BufReader::new(f);
    let docs = if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        read_jsonl(reader)?
    } else {
        read_json(reader)?
    };
    tracing::info!(path = %path.display(), documents = docs.len(), "loaded seed corpus");
    Ok(docs)
}

fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<NewDocument>> {
    let mut docs = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: NewDocument = serde_json::from_str(&line).with_context(|| format!("line {}", lineno + 1))?;
        docs.push(doc);
    }
    Ok(docs)
}

fn read_json<R: BufRead>(reader: R) -> Result<Vec<NewDocument>> {
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs: Vec<NewDocument> = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value::<NewDocument>)
            .collect::<std::result::Result<_, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => anyhow::bail!("seed corpus must be a JSON array or object"),
    };
    Ok(docs)
}

const SAMPLE: &[&str] = &[
    "Lorem ipsum blah blah fox",
    "The quick brown fox jumped over the lazy dog. The dog slept peacefully.",
    "To be, or not to be, that is the question: Whether 'tis nobler in the mind to suffer The slings and arrows of outrageous fortune, Or to take arms against a sea of troubles And by opposing end them.",
    "In a hole in the ground there lived a hobbit. Not a nasty, dirty, wet hole, filled with the ends of worms and an oozy smell, nor yet a dry, bare, sandy hole with nothing in it to sit down on or to eat: it was a hobbit-hole, and that means comfort.",
    "It is a truth universally acknowledged, that a single man in possession of a good fortune, must be in want of a wife.",
    "Two households, both alike in dignity, In fair Verona, where we lay our scene, From ancient grudge break to new mutiny, Where civil blood makes civil hands unclean.",
    "Once upon a time in a far-off land, there was a princess who was very beautiful and very kind, but also very sad.",
    "In Xanadu did Kubla Khan A stately pleasure-dome decree: Where Alph, the sacred river, ran Through caverns measureless to man Down to a sunless sea.",
    "The love that moves the sun and all the stars.",
    "Happy families are all alike; every unhappy family is unhappy in its own way.",
    "As Gregor Samsa awoke one morning from uneasy dreams he found himself transformed in his bed into a gigantic insect.",
    "Call me Ishmael. Some years ago, never mind how long precisely, having little or no money in my purse, and nothing particular to interest me on shore, I thought I would sail about a little and see the watery part of the world.",
    "It was the day my grandmother exploded.",
    "아이유(IU, 본명: 이지은, 1993년 5월 16일~)는 대한민국의 가수이자 배우이다.",
];

/// Built-in seed collection of short literary passages.
pub fn sample_corpus() -> Vec<NewDocument> {
    SAMPLE.iter().map(|text| NewDocument::new(*text)).collect()
}
