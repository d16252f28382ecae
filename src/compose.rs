use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{Classification, ContentType, Difficulty, Intent, contains_any, fold_case};

const IMAGE_PROMPT_BASE: &str =
    "A beautiful, educational, and inspiring illustration representing";

// Checked in this order and appended together; several can apply at once.
const TOPICAL_RULES: &[(&[&str], &str)] = &[
    (
        &["future", "gelecek"],
        "Focus on future plans and aspirations using appropriate future tenses.",
    ),
    (
        &["past", "geçmiş"],
        "Use past tenses effectively to describe past events and experiences.",
    ),
    (
        &["opinion", "görüş"],
        "Express clear opinions with supporting reasons and examples.",
    ),
    (
        &["compare", "karşılaştır"],
        "Use comparison structures and contrast different aspects clearly.",
    ),
    (
        &["environment", "çevre"],
        "Include relevant environmental issues and solutions.",
    ),
    (
        &["technology", "teknoloji"],
        "Discuss modern technology and its impact on daily life.",
    ),
];

static IMAGE_TITLE_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)write|essay|paragraph|story|letter").unwrap());

/// Builds the instruction sent to the text model for `title`.
pub fn compose_prompt(title: &str, classification: &Classification) -> String {
    match classification.intent {
        Intent::Explain => explanation_prompt(title, classification.difficulty),
        Intent::Produce => production_prompt(title, classification),
    }
}

fn explanation_prompt(title: &str, difficulty: Difficulty) -> String {
    let level = match difficulty {
        Difficulty::Intermediate => String::new(),
        other => format!(
            "\nSeviye: {} seviyesinde açıkla.\n",
            other.turkish_label()
        ),
    };

    format!(
        "Aşağıdaki İngilizce konusu hakkında Türkçe olarak detaylı bir açıklama yap: \"{title}\"\n\
         \n\
         Açıklama şu özelliklere sahip olmalı:\n\
         - Türkçe olarak yazılmış ve anlaşılır\n\
         - Öğretici ve pratik örneklerle desteklenmiş\n\
         - Gramer kuralları varsa net bir şekilde açıklanmış\n\
         - Günlük hayattan örnekler içeren\n\
         - Yaygın hatalar ve bunlardan kaçınma yolları\n\
         - Pratik kullanım ipuçları\n\
         - Öğrenci seviyesine uygun\n\
         {level}\n\
         Açıklamayı doğrudan yaz, ek başlık kullanma."
    )
}

fn production_prompt(title: &str, classification: &Classification) -> String {
    let content_type = classification.content_type;
    let word_count = match classification.word_count {
        Some(count) => format!("The response should be approximately {count} words."),
        None => format!(
            "The response should be {} words.",
            default_word_range(content_type)
        ),
    };
    let special = special_instructions(content_type, title);
    let special = if special.is_empty() {
        String::new()
    } else {
        format!("\n{special}\n")
    };

    format!(
        "Help with this English {content_type} assignment: \"{title}\"\n\
         \n\
         Provide a well-written response in English that:\n\
         - Is written in proper, natural English\n\
         - Has excellent grammar and varied vocabulary\n\
         - Is appropriate for {difficulty} level students\n\
         - {structure}\n\
         - {word_count}\n\
         - Uses varied sentence structures and transitions\n\
         - Is original, engaging, and educational\n\
         - Includes relevant examples and details\n\
         - Has a clear and logical flow\n\
         {special}\n\
         Write the content directly without additional titles or headers.",
        difficulty = classification.difficulty,
        structure = content_structure(content_type),
    )
}

pub fn default_word_range(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Essay => "300-500",
        ContentType::Paragraph => "100-150",
        ContentType::Letter => "200-300",
        ContentType::Story => "250-400",
        ContentType::Dialogue => "150-250",
        ContentType::Report => "300-400",
        ContentType::Review => "200-300",
        ContentType::Speech => "250-350",
        ContentType::Description => "150-200",
        ContentType::General => "200-300",
    }
}

pub fn content_structure(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Essay => {
            "Includes a clear introduction with thesis statement, well-developed body paragraphs, and a strong conclusion"
        }
        ContentType::Paragraph => {
            "Has a clear topic sentence, supporting details, and concluding sentence"
        }
        ContentType::Letter => {
            "Follows proper letter format with greeting, body paragraphs, and appropriate closing"
        }
        ContentType::Story => {
            "Has engaging characters, clear setting, plot development, and satisfying resolution"
        }
        ContentType::Dialogue => {
            "Features natural conversation with proper dialogue formatting and character development"
        }
        ContentType::Report => {
            "Presents information clearly with introduction, findings, and recommendations"
        }
        ContentType::Review => {
            "Provides balanced evaluation with specific examples and clear judgment"
        }
        ContentType::Speech => {
            "Has attention-grabbing opening, clear main points, and memorable conclusion"
        }
        ContentType::Description => {
            "Uses vivid sensory details and descriptive language to create clear mental images"
        }
        ContentType::General => {
            "Has clear structure with introduction, development, and conclusion"
        }
    }
}

fn content_type_instruction(content_type: ContentType, folded_title: &str) -> Option<&'static str> {
    match content_type {
        ContentType::Essay => {
            Some("Use formal academic tone and provide strong arguments with evidence.")
        }
        ContentType::Letter if contains_any(folded_title, &["formal", "resmi"]) => {
            Some("Use formal language and professional tone.")
        }
        ContentType::Letter if contains_any(folded_title, &["informal", "arkadaş"]) => {
            Some("Use friendly, casual tone while maintaining proper structure.")
        }
        ContentType::Story => Some(
            "Create engaging characters and use descriptive language to bring the story to life.",
        ),
        ContentType::Dialogue => {
            Some("Make the conversation sound natural and realistic with proper punctuation.")
        }
        _ => None,
    }
}

/// Tone guidance for the content type followed by every matching topical hint.
pub fn special_instructions(content_type: ContentType, title: &str) -> String {
    let folded = fold_case(title);
    content_type_instruction(content_type, &folded)
        .into_iter()
        .chain(
            TOPICAL_RULES
                .iter()
                .filter(|(keywords, _)| contains_any(&folded, keywords))
                .map(|(_, fragment)| *fragment),
        )
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prompt for the illustration. Explanations never get one.
pub fn compose_image_prompt(title: &str, classification: &Classification) -> Option<String> {
    if classification.intent == Intent::Explain {
        return None;
    }

    let clean_title = IMAGE_TITLE_NOISE_RE.replace_all(title, "");
    let style = match classification.content_type {
        ContentType::Story => "in a storytelling illustration style, colorful and imaginative",
        ContentType::Essay => "in an academic and professional style, clean and modern",
        ContentType::Letter => "in a communication theme, warm and friendly",
        ContentType::Description => "in a detailed and realistic style, vivid and clear",
        _ => "in a modern educational style, bright and engaging",
    };

    Some(format!(
        "{IMAGE_PROMPT_BASE} \"{}\" {style}, high quality, professional, suitable for educational content, 4K resolution",
        clean_title.trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn prompt_for(title: &str) -> String {
        compose_prompt(title, &classify(title))
    }

    #[test]
    fn essay_without_count_uses_default_range() {
        let prompt = prompt_for("Write an essay about school life");
        assert!(prompt.contains("300-500 words"));
        assert!(prompt.contains("Help with this English essay assignment"));
        assert!(prompt.contains("Use formal academic tone"));
    }

    #[test]
    fn explicit_count_overrides_default_range() {
        let prompt = prompt_for("Write a 120 word paragraph about my pet");
        assert!(prompt.contains("approximately 120 words"));
        assert!(!prompt.contains("100-150"));
    }

    #[test]
    fn general_writing_falls_back_to_generic_structure() {
        let prompt = prompt_for("My summer holiday");
        assert!(prompt.contains("English general writing assignment"));
        assert!(prompt.contains("200-300 words"));
        assert!(prompt.contains("introduction, development, and conclusion"));
        assert!(prompt.contains("intermediate level students"));
    }

    #[test]
    fn explanation_prompt_is_turkish() {
        let prompt = prompt_for("Present perfect tense nedir? temel seviye");
        assert!(prompt.starts_with("Aşağıdaki İngilizce konusu"));
        assert!(prompt.contains("Seviye: başlangıç seviyesinde açıkla."));
        assert!(prompt.ends_with("Açıklamayı doğrudan yaz, ek başlık kullanma."));
        assert!(!prompt.contains("words"));
    }

    #[test]
    fn intermediate_explanation_has_no_level_line() {
        let prompt = prompt_for("Explain the passive voice");
        assert!(!prompt.contains("Seviye:"));
    }

    #[test]
    fn uppercase_turkish_topics_add_hints() {
        let special = special_instructions(ContentType::Letter, "ARKADAŞIMA GEÇMİŞ HAKKINDA MEKTUP");
        assert!(special.starts_with("Use friendly, casual tone"));
        assert!(special.contains("Use past tenses effectively"));

        let special = special_instructions(ContentType::General, "İki şehri KARŞILAŞTIR");
        assert!(special.contains("comparison structures"));
    }

    #[test]
    fn zero_word_count_uses_default_range() {
        let prompt = prompt_for("Write 0 words essay");
        assert!(prompt.contains("300-500 words"));
        assert!(!prompt.contains("approximately 0 words"));
    }

    #[test]
    fn letter_tone_depends_on_formality() {
        let formal = special_instructions(ContentType::Letter, "formal letter to the mayor");
        assert_eq!(formal, "Use formal language and professional tone.");

        let informal = special_instructions(ContentType::Letter, "informal letter to a friend");
        // "informal" also contains "formal", so the formal branch wins.
        assert_eq!(informal, "Use formal language and professional tone.");

        let friendly = special_instructions(ContentType::Letter, "arkadaşıma mektup");
        assert_eq!(
            friendly,
            "Use friendly, casual tone while maintaining proper structure."
        );

        assert!(special_instructions(ContentType::Letter, "letter to grandma").is_empty());
    }

    #[test]
    fn topical_hints_combine_in_order() {
        let special = special_instructions(
            ContentType::Essay,
            "compare past and future technology and the environment",
        );
        let expected = [
            "Use formal academic tone",
            "future tenses",
            "past tenses",
            "comparison structures",
            "environmental issues",
            "modern technology",
        ];
        let mut last = 0;
        for fragment in expected {
            let position = special[last..]
                .find(fragment)
                .map(|offset| offset + last)
                .unwrap_or_else(|| panic!("missing or out of order: {fragment}"));
            last = position;
        }
    }

    #[test]
    fn image_prompt_strips_genre_words() {
        let title = "Write a Story about the sea";
        let prompt = compose_image_prompt(title, &classify(title)).unwrap();
        assert!(prompt.contains("\"a  about the sea\""));
        assert!(prompt.contains("storytelling illustration style"));
    }

    #[test]
    fn explanations_never_get_an_image_prompt() {
        let title = "Explain the story of Romeo and Juliet";
        assert!(compose_image_prompt(title, &classify(title)).is_none());
    }

    #[test]
    fn prompt_is_never_empty() {
        assert!(!prompt_for("").is_empty());
    }
}
