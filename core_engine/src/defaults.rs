//! Built-in tables used when no persisted dictionary exists and for the
//! rule-driven stages. Everything here is lowercase ASCII except the gloss
//! targets.

/// Misspelling -> canonical spelling. Order is the vocabulary order.
pub const CORRECTIONS: &[(&str, &str)] = &[
    // common misspellings
    ("ame", "ami"),
    ("amr", "amar"),
    ("tmr", "tomar"),
    ("tmi", "tumi"),
    ("kmn", "kemon"),
    ("kno", "keno"),
    ("valo", "bhalo"),
    ("vhalo", "bhalo"),
    // verb forms
    ("korchi", "korchi"),
    ("korchis", "korchish"),
    ("korsen", "korchen"),
    ("koros", "korish"),
    ("koro", "koro"),
    ("korte", "korte"),
    // phrases
    ("kivabe", "kibhabe"),
    ("kemne", "kemone"),
    ("onek", "onek"),
    ("kothay", "kothai"),
    ("kothai", "kothai"),
    ("khub", "khub"),
    // colloquial
    ("accha", "achcha"),
    ("acha", "achcha"),
    ("hae", "hyan"),
    ("thik", "thik"),
    ("hocche", "hochche"),
];

pub const CONSONANT_RULES: &[(&str, &[&str])] = &[
    ("ch", &["ch", "c", "ts", "cch"]),
    ("sh", &["sh", "s", "ss", "cch"]),
    ("th", &["th", "t", "tth"]),
    ("kh", &["kh", "k", "kkh"]),
    ("bh", &["bh", "b", "v"]),
    ("gh", &["gh", "g"]),
    ("jh", &["jh", "j", "z"]),
    ("ph", &["ph", "f"]),
];

pub const VOWEL_RULES: &[(&str, &[&str])] = &[
    ("o", &["o", "oo", "u"]),
    ("i", &["i", "ee", "y"]),
    ("e", &["e", "ay", "ey"]),
    ("a", &["a", "aa", "ah"]),
];

pub const ENDING_RULES: &[(&str, &[&str])] = &[
    ("e", &["a", "o", "ey"]),
    ("o", &["u", "oo"]),
    ("i", &["ee", "y"]),
    ("che", &["ce", "che", "chhe", "cche"]),
];

pub const VERB_PRESENT: &[(&str, &[&str])] = &[
    ("kori", &["kori", "kri", "kari"]),
    ("koro", &["koro", "kro", "karo"]),
    ("kore", &["kore", "kre", "kare"]),
];

pub const VERB_PAST: &[(&str, &[&str])] = &[
    ("korlam", &["korlam", "karlam", "korlm"]),
    ("korlo", &["korlo", "karlo", "krlo"]),
    ("korlen", &["korlen", "karlen", "krlen"]),
];

pub const VERB_CONTINUOUS: &[(&str, &[&str])] = &[
    ("korchi", &["korchi", "korchhi", "krchi"]),
    ("korcho", &["korcho", "korchho", "krcho"]),
    ("korche", &["korche", "korchhe", "krche"]),
];

pub const PRONOUNS: &[(&str, &[&str])] = &[
    ("ami", &["ami", "ame", "amr", "amar"]),
    ("tumi", &["tumi", "tmi", "tmr", "tomar"]),
    ("se", &["se", "she", "shey"]),
];

/// Canonical Banglish -> Bengali script, display only.
pub const GLOSS: &[(&str, &str)] = &[
    ("ami", "আমি"),
    ("amar", "আমার"),
    ("tumi", "তুমি"),
    ("tomar", "তোমার"),
    ("se", "সে"),
    ("kemon", "কেমন"),
    ("keno", "কেন"),
    ("bhalo", "ভালো"),
    ("acho", "আছো"),
    ("achi", "আছি"),
    ("kori", "করি"),
    ("koro", "করো"),
    ("kore", "করে"),
    ("korte", "করতে"),
    ("korlam", "করলাম"),
    ("korlo", "করলো"),
    ("korlen", "করলেন"),
    ("korchi", "করছি"),
    ("korcho", "করছো"),
    ("korche", "করছে"),
    ("korchish", "করছিস"),
    ("korchen", "করছেন"),
    ("korish", "করিস"),
    ("kibhabe", "কিভাবে"),
    ("kemone", "কেমনে"),
    ("onek", "অনেক"),
    ("kothai", "কোথায়"),
    ("khub", "খুব"),
    ("achcha", "আচ্ছা"),
    ("hyan", "হ্যাঁ"),
    ("thik", "ঠিক"),
    ("hochche", "হচ্ছে"),
];
