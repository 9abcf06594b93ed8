//! ITRANS to Devanagari transliteration for patient names.
//!
//! Longest-match tokenizer over the ITRANS tables. Consonants carry the
//! inherent `a`; any other vowel after a consonant becomes a vowel sign, and a
//! consonant not followed by a vowel gets a virama. Uppercase letters that mean
//! nothing in ITRANS are read as their lowercase form. Anything else (spaces,
//! digits, punctuation) is copied through.

const VIRAMA: char = '\u{094D}';
const MAX_TOKEN_LEN: usize = 3;

#[derive(Clone, Copy)]
enum Token {
    /// Independent form and dependent sign (empty for the inherent `a`).
    Vowel(&'static str, &'static str),
    Consonant(&'static str),
    /// Anusvara, visarga and friends; attach to whatever precedes them.
    Mark(&'static str),
}

use Token::*;

const TOKENS: &[(&str, Token)] = &[
    // Vowels
    ("a", Vowel("अ", "")),
    ("aa", Vowel("आ", "ा")),
    ("A", Vowel("आ", "ा")),
    ("i", Vowel("इ", "ि")),
    ("ii", Vowel("ई", "ी")),
    ("I", Vowel("ई", "ी")),
    ("ee", Vowel("ई", "ी")),
    ("u", Vowel("उ", "ु")),
    ("uu", Vowel("ऊ", "ू")),
    ("U", Vowel("ऊ", "ू")),
    ("oo", Vowel("ऊ", "ू")),
    ("RRi", Vowel("ऋ", "ृ")),
    ("R^i", Vowel("ऋ", "ृ")),
    ("RRI", Vowel("ॠ", "ॄ")),
    ("R^I", Vowel("ॠ", "ॄ")),
    ("LLi", Vowel("ऌ", "ॢ")),
    ("L^i", Vowel("ऌ", "ॢ")),
    ("e", Vowel("ए", "े")),
    ("ai", Vowel("ऐ", "ै")),
    ("o", Vowel("ओ", "ो")),
    ("au", Vowel("औ", "ौ")),
    // Marks
    ("M", Mark("ं")),
    (".n", Mark("ं")),
    (".m", Mark("ं")),
    ("H", Mark("ः")),
    (".N", Mark("ँ")),
    (".a", Mark("ऽ")),
    // Consonants
    ("k", Consonant("क")),
    ("kh", Consonant("ख")),
    ("g", Consonant("ग")),
    ("gh", Consonant("घ")),
    ("~N", Consonant("ङ")),
    ("N^", Consonant("ङ")),
    ("c", Consonant("च")),
    ("ch", Consonant("च")),
    ("C", Consonant("छ")),
    ("Ch", Consonant("छ")),
    ("chh", Consonant("छ")),
    ("j", Consonant("ज")),
    ("jh", Consonant("झ")),
    ("~n", Consonant("ञ")),
    ("JN", Consonant("ञ")),
    ("T", Consonant("ट")),
    ("Th", Consonant("ठ")),
    ("D", Consonant("ड")),
    ("Dh", Consonant("ढ")),
    ("N", Consonant("ण")),
    ("t", Consonant("त")),
    ("th", Consonant("थ")),
    ("d", Consonant("द")),
    ("dh", Consonant("ध")),
    ("n", Consonant("न")),
    ("p", Consonant("प")),
    ("ph", Consonant("फ")),
    ("b", Consonant("ब")),
    ("bh", Consonant("भ")),
    ("m", Consonant("म")),
    ("y", Consonant("य")),
    ("r", Consonant("र")),
    ("l", Consonant("ल")),
    ("v", Consonant("व")),
    ("w", Consonant("व")),
    ("sh", Consonant("श")),
    ("S", Consonant("ष")),
    ("Sh", Consonant("ष")),
    ("shh", Consonant("ष")),
    ("s", Consonant("स")),
    ("h", Consonant("ह")),
    ("L", Consonant("ळ")),
    ("ld", Consonant("ळ")),
    ("x", Consonant("क्ष")),
    ("kS", Consonant("क्ष")),
    ("kSh", Consonant("क्ष")),
    ("GY", Consonant("ज्ञ")),
    ("j~n", Consonant("ज्ञ")),
    ("dny", Consonant("ज्ञ")),
    // Nukta forms
    ("q", Consonant("क़")),
    ("K", Consonant("ख़")),
    ("G", Consonant("ग़")),
    ("z", Consonant("ज़")),
    ("J", Consonant("ज़")),
    ("f", Consonant("फ़")),
    (".D", Consonant("ड़")),
    (".Dh", Consonant("ढ़")),
    ("Y", Consonant("य़")),
];

fn lookup(candidate: &str) -> Option<Token> {
    TOKENS
        .iter()
        .find(|(key, _)| *key == candidate)
        .map(|(_, token)| *token)
}

/// Longest token starting at `start`, with its length in chars.
fn next_token(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let longest = MAX_TOKEN_LEN.min(chars.len() - start);

    for len in (1..=longest).rev() {
        let candidate: String = chars[start..start + len].iter().collect();
        if let Some(token) = lookup(&candidate) {
            return Some((token, len));
        }
    }

    // Uppercase letters with no ITRANS meaning read as lowercase
    if chars[start].is_ascii_uppercase() {
        let lowered = chars[start].to_ascii_lowercase();
        for len in (1..=longest).rev() {
            let candidate: String = std::iter::once(lowered)
                .chain(chars[start + 1..start + len].iter().copied())
                .collect();
            if let Some(token) = lookup(&candidate) {
                return Some((token, len));
            }
        }
    }

    None
}

/// Transliterate an ITRANS-spelled name into Devanagari.
///
/// Pure and total: empty or blank input gives an empty string.
pub fn itrans_to_devanagari(input: &str) -> String {
    let chars: Vec<char> = input.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() * 3);
    // A consonant was written and still waits for its vowel
    let mut open_consonant = false;
    let mut i = 0;

    while i < chars.len() {
        match next_token(&chars, i) {
            Some((Vowel(independent, sign), len)) => {
                if open_consonant {
                    out.push_str(sign);
                } else {
                    out.push_str(independent);
                }
                open_consonant = false;
                i += len;
            }
            Some((Consonant(letter), len)) => {
                if open_consonant {
                    out.push(VIRAMA);
                }
                out.push_str(letter);
                open_consonant = true;
                i += len;
            }
            Some((Mark(mark), len)) => {
                out.push_str(mark);
                open_consonant = false;
                i += len;
            }
            None => {
                if open_consonant {
                    out.push(VIRAMA);
                }
                out.push(chars[i]);
                open_consonant = false;
                i += 1;
            }
        }
    }

    if open_consonant {
        out.push(VIRAMA);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(itrans_to_devanagari(""), "");
        assert_eq!(itrans_to_devanagari("   "), "");
    }

    #[test]
    fn test_inherent_vowel_and_signs() {
        assert_eq!(itrans_to_devanagari("rAma"), "राम");
        assert_eq!(itrans_to_devanagari("sItA"), "सीता");
        assert_eq!(itrans_to_devanagari("aditi"), "अदिति");
        assert_eq!(itrans_to_devanagari("gaNesha"), "गणेश");
    }

    #[test]
    fn test_final_consonant_gets_virama() {
        assert_eq!(itrans_to_devanagari("ramesh"), "रमेश्");
    }

    #[test]
    fn test_conjuncts() {
        assert_eq!(itrans_to_devanagari("kRRiShNa"), "कृष्ण");
        assert_eq!(itrans_to_devanagari("j~nAna"), "ज्ञान");
        assert_eq!(itrans_to_devanagari("lakShmI"), "लक्ष्मी");
    }

    #[test]
    fn test_doubled_vowel_spellings() {
        assert_eq!(itrans_to_devanagari("deepak"), "दीपक्");
        assert_eq!(itrans_to_devanagari("pooja"), "पूज");
        assert_eq!(itrans_to_devanagari("eeshA"), "ईशा");
        assert_eq!(itrans_to_devanagari("oo"), "ऊ");
    }

    #[test]
    fn test_short_capital_consonants() {
        assert_eq!(itrans_to_devanagari("aSTa"), "अष्ट");
        assert_eq!(itrans_to_devanagari("Cavi"), "छवि");
        assert_eq!(itrans_to_devanagari("kSitij"), "क्षितिज्");
        assert_eq!(itrans_to_devanagari("lakSmI"), itrans_to_devanagari("lakShmI"));
    }

    #[test]
    fn test_marks() {
        assert_eq!(itrans_to_devanagari("shAMta"), "शांत");
        assert_eq!(itrans_to_devanagari("duHkha"), "दुःख");
    }

    #[test]
    fn test_undefined_capitals_read_lowercase() {
        assert_eq!(itrans_to_devanagari("Ramesh"), "रमेश्");
        assert_eq!(itrans_to_devanagari("Bharat"), "भरत्");
    }

    #[test]
    fn test_words_and_trimming() {
        assert_eq!(itrans_to_devanagari("  rAma prasAd "), "राम प्रसाद्");
    }

    #[test]
    fn test_deterministic() {
        let first = itrans_to_devanagari("sunIl kumAr");
        let second = itrans_to_devanagari("sunIl kumAr");
        assert_eq!(first, second);
        assert_eq!(first, "सुनील् कुमार्");
    }
}
