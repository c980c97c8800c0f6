// File: src/text/lists.rs
//
// Fixed word lists shared by the mimicry scorer and the greeting rule.
// These are policy data, not configuration: changing them changes what
// "template behavior" means, so they ship with the engine.

/// Generic greeting / filler phrases typical of scripted first messages.
/// Matching is case-insensitive substring over the normalized text.
pub const TEMPLATE_GREETINGS: &[&str] = &[
    "привет",
    "приветствую",
    "здравствуйте",
    "здравствуй",
    "добрый день",
    "добрый вечер",
    "доброе утро",
    "доброй ночи",
    "здарова",
    "салют",
    "хай",
    "прив",
    "ку",
    "ок",
    "hello",
    "hi all",
    "hi everyone",
    "good morning",
    "good evening",
    "greetings",
];

/// Agreement words that indicate the user is actually responding to the
/// conversation rather than broadcasting.
pub const AGREEMENT_WORDS: &[&str] = &[
    "да",
    "ага",
    "согласен",
    "согласна",
    "точно",
    "верно",
    "именно",
    "конечно",
    "yes",
    "agree",
    "exactly",
];

/// Comparative phrases referencing shared context.
pub const COMPARATIVE_PHRASES: &[&str] = &[
    "тоже",
    "также",
    "у меня",
    "у нас",
    "как у",
    "me too",
    "same here",
];

/// Function words excluded from classifier features. Mixed Russian/English
/// because the moderated streams are.
pub const CLASSIFIER_STOP_WORDS: &[&str] = &[
    "и", "в", "во", "не", "что", "он", "на", "я", "с", "со", "как", "а", "то", "все", "она",
    "так", "его", "но", "да", "ты", "к", "у", "же", "вы", "за", "бы", "по", "ее", "мне",
    "было", "вот", "от", "меня", "еще", "нет", "о", "из", "ему", "теперь", "когда", "даже",
    "ну", "ли", "если", "уже", "или", "ни", "быть", "был", "него", "до", "вас", "нибудь",
    "вам", "сказал", "себя", "ей", "может", "они", "есть", "надо", "ней", "для", "мы",
    "тебя", "их", "чем", "была", "сам", "чтоб", "без", "будто", "чего", "раз", "тоже",
    "себе", "под", "будет", "тогда", "кто", "этот", "the", "a", "an", "and", "or",
    "but", "if", "then", "is", "are", "was", "were", "be", "been", "to", "of", "in", "on",
    "at", "for", "with", "by", "from", "this", "that", "it", "as", "not", "no", "so", "we",
    "you", "they", "he", "she", "i", "my", "your", "our",
];
