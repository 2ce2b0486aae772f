//! Placeholder free text (lorem ipsum)

use rand::Rng;

use crate::random::{int_between, pick};

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "reprehenderit",
    "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint",
    "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia", "deserunt",
    "mollit", "anim", "id", "est", "laborum",
];

/// One capitalised sentence of 4 to 12 words
pub fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = int_between(rng, 4, 12) as usize;
    let mut sentence = String::new();
    for i in 0..count {
        let word = *pick(rng, WORDS);
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                sentence.extend(first.to_uppercase());
                sentence.push_str(chars.as_str());
            }
        } else {
            sentence.push(' ');
            sentence.push_str(word);
        }
    }
    sentence.push('.');
    sentence
}

/// A paragraph of 3 to 6 sentences
pub fn paragraph<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = int_between(rng, 3, 6);
    (0..count)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `count` paragraphs separated by newlines
pub fn paragraphs<R: Rng + ?Sized>(rng: &mut R, count: u32) -> String {
    (0..count)
        .map(|_| paragraph(rng))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::batch_rng;

    #[test]
    fn test_sentence_shape() {
        let mut rng = batch_rng(21, 0);
        for _ in 0..100 {
            let s = sentence(&mut rng);
            assert!(s.ends_with('.'));
            assert!(s.chars().next().unwrap().is_uppercase());
            let words = s.split_whitespace().count();
            assert!((4..=12).contains(&words));
        }
    }

    #[test]
    fn test_paragraph_count() {
        let mut rng = batch_rng(22, 0);
        let text = paragraphs(&mut rng, 4);
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().all(|p| !p.is_empty()));
    }
}
