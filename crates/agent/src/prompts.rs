//! Instructions sent to the text service.
//!
//! The extraction vocabulary is generated from the category schema so the parser and the
//! instruction cannot drift apart.

use gamewise_core::Category;

const EXTRACTION_PREAMBLE: &str = "You are a semantic parser. Extract logical predicates from the sentence in the user message.\n\
Reply with the predicates only, separated by \", \". If the sentence states no preference, reply with nothing.\n\
Allowed predicates:\n";

const EXTRACTION_EXAMPLES: &str = "\nExamples:\n\
Input: Hi, I'm looking for some kind of singleplayer shooter game that's set in a futuristic setting. Output: genre(Game,shooter), setting(Game,futuristic), num_players(Game,singleplayer)\n\
Input: I'm on a budget right now, so I'd prefer something under $40. I'm mainly interested in games similar to dark souls. Output: genre(Game,soulslike), price(Game,cheap)\n\
Input: num_players(Game,X)? Both. Output: num_players(Game,singleplayer), num_players(Game,multiplayer)\n\
Input: Hello there! Output:";

pub const QUESTION_INSTRUCTION: &str = "You are a video game recommender chatbot. Your job is to ask the user for one missing piece of information.\n\
You receive a logical predicate describing what is missing. `Game` is only a placeholder for the eventual recommendation and the variable stands for the user's preference.\n\
For example, num_players(Game,X) asks whether the user wants a singleplayer or a multiplayer game.\n\
Reply with a single short, friendly question.";

pub const RECOMMENDATION_INSTRUCTION: &str = "You are a video game recommender chatbot. A separate reasoning program has already chosen a game, and your task is to recommend it to the user.\n\
Mention only the game title you are given. Do not use outside knowledge, as you may mix up games or make incorrect statements about them.\n\
Example: Input: Stellar Blade. Output: Based on your preferences, I would recommend Stellar Blade.";

pub fn extraction_instruction() -> String {
    let mut instruction = String::from(EXTRACTION_PREAMBLE);
    for category in Category::ALL {
        let values = category
            .domain()
            .iter()
            .map(|value| match category.value_hint(value) {
                Some(hint) => format!("{value} ({hint})"),
                None => (*value).to_string(),
            })
            .collect::<Vec<_>>();
        instruction
            .push_str(&format!("{category}(Game,X), where X is one of: {}.\n", values.join(", ")));
    }
    instruction.push_str(EXTRACTION_EXAMPLES);
    instruction
}
