use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref LATIN: Regex = Regex::new(r"\p{Latin}").expect("valid regex");
    static ref HANGUL: Regex = Regex::new(r"\p{Hangul}").expect("valid regex");
    static ref KANA: Regex = Regex::new(r"[\p{Hiragana}\p{Katakana}]").expect("valid regex");
    static ref HAN: Regex = Regex::new(r"\p{Han}").expect("valid regex");
    static ref ENGLISH: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
    static ref FRENCH: HashSet<&'static str> = [
        "au","aux","avec","ce","ces","dans","de","des","du","elle","en","et","eux","il","ils","je","la","le","les",
        "leur","lui","ma","mais","me","mes","moi","mon","ne","nos","notre","nous","on","ou","par","pas","pour",
        "qu","que","qui","sa","se","ses","son","sur","ta","te","tes","toi","ton","tu","un","une","vos","votre","vous",
        "c'est","d'un","d'une","est","sont","été","être",
    ]
    .into_iter()
    .collect();
    static ref GERMAN: HashSet<&'static str> = [
        "aber","als","am","an","auch","auf","aus","bei","bin","bis","da","das","dass","dem","den","der","des","die",
        "dies","doch","du","ein","eine","einem","einen","einer","es","für","hat","ich","ihr","im","in","ist","ja",
        "kein","mit","nach","nicht","noch","nur","oder","sich","sie","sind","so","um","und","uns","von","vor","war",
        "was","wie","wir","wird","zu","zum","zur",
    ]
    .into_iter()
    .collect();
    static ref SPANISH: HashSet<&'static str> = [
        "a","al","algo","con","como","de","del","el","ella","ellos","en","entre","era","es","esta","este","esto",
        "fue","ha","hay","la","las","le","les","lo","los","me","mi","muy","más","ni","no","nos","o","para","pero",
        "por","porque","que","se","sin","sobre","su","sus","también","te","tu","un","una","uno","y","ya","yo",
    ]
    .into_iter()
    .collect();
}

/// Languages the stopword cleaner recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    French,
    German,
    Spanish,
    Korean,
    Japanese,
    Chinese,
}

impl Language {
    /// Latin-script languages, in tie-break order.
    const LATIN_SCRIPT: [Language; 4] = [Language::English, Language::French, Language::German, Language::Spanish];

    /// Stopword list, if the language has one. CJK queries are left as they are.
    pub fn stopwords(self) -> Option<&'static HashSet<&'static str>> {
        match self {
            Language::English => Some(&*ENGLISH),
            Language::French => Some(&*FRENCH),
            Language::German => Some(&*GERMAN),
            Language::Spanish => Some(&*SPANISH),
            Language::Korean | Language::Japanese | Language::Chinese => None,
        }
    }
}

/// Best-effort language of `text`.
///
/// CJK scripts are recognized by their characters (kana before Han, since
/// Japanese mixes both). Latin text goes to whichever list recognizes the most
/// of its words, English on a tie or when none do. `None` when the text has
/// no letters from a supported script.
pub fn detect_language(text: &str) -> Option<Language> {
    if HANGUL.is_match(text) {
        return Some(Language::Korean);
    }
    if KANA.is_match(text) {
        return Some(Language::Japanese);
    }
    if HAN.is_match(text) {
        return Some(Language::Chinese);
    }
    if !LATIN.is_match(text) {
        return None;
    }
    let words: Vec<String> = text.split_whitespace().map(bare_word).collect();
    let mut best = (Language::English, 0);
    for lang in Language::LATIN_SCRIPT {
        let Some(list) = lang.stopwords() else { continue };
        let hits = words.iter().filter(|w| list.contains(w.as_str())).count();
        if hits > best.1 {
            best = (lang, hits);
        }
    }
    Some(best.0)
}

fn bare_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'').to_lowercase()
}

/// Prepares raw query text before tokenization.
///
/// Returning `None` signals that detection or cleaning failed; the engine then
/// searches with the raw query instead.
pub trait QueryCleaner: Send + Sync {
    fn clean(&self, query: &str) -> Option<String>;
}

/// Passes queries through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityCleaner;

impl QueryCleaner for IdentityCleaner {
    fn clean(&self, query: &str) -> Option<String> {
        Some(query.to_string())
    }
}

/// Stopword removal in the query's detected language.
///
/// English, French, German and Spanish queries lose their stopwords; Korean,
/// Japanese and Chinese queries pass through unchanged. Queries in no
/// supported script are treated as an undetected language.
#[derive(Debug, Default, Clone, Copy)]
pub struct StopwordCleaner;

impl QueryCleaner for StopwordCleaner {
    fn clean(&self, query: &str) -> Option<String> {
        let lang = detect_language(query)?;
        let Some(list) = lang.stopwords() else {
            return Some(query.to_string());
        };
        let kept: Vec<&str> = query
            .split_whitespace()
            .filter(|w| !list.contains(bare_word(w).as_str()))
            .collect();
        Some(kept.join(" "))
    }
}
