//! Member karma, adjusted by mentioning people

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use robbot_core::{CallbackFeature, CommandCategory, CommandSubcategory, KeywordParser, Message};

const NO_MENTIONS: &str = "Nämn någon med @ så vet jag vem du menar.";
const NOBODY_RANKED: &str = "Ingen har rankats än.";

#[derive(Debug, Default)]
pub struct Rankings {
    scores: Mutex<BTreeMap<String, i64>>,
}

impl Rankings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, member: &str) -> Option<i64> {
        self.scores.lock().get(member).copied()
    }

    fn adjust(&self, message: &Message, delta: i64, verb: &str) -> String {
        let mentions = &message.context.mentions;
        if mentions.is_empty() {
            return NO_MENTIONS.to_string();
        }
        let mut scores = self.scores.lock();
        mentions
            .iter()
            .map(|member| {
                let score = scores.entry(member.clone()).or_insert(0);
                *score += delta;
                format!("{member} {verb} till: {score}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn rank_up(&self, message: &Message) -> String {
        self.adjust(message, 1, "ökade")
    }

    pub fn rank_down(&self, message: &Message) -> String {
        self.adjust(message, -1, "minskade")
    }

    pub fn rank_for_member(&self, message: &Message) -> String {
        let mentions = &message.context.mentions;
        if mentions.is_empty() {
            return NO_MENTIONS.to_string();
        }
        let scores = self.scores.lock();
        mentions
            .iter()
            .map(|member| match scores.get(member) {
                Some(score) => format!("{member} rankar: {score}"),
                None => format!("{member} har inte rankats"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn rank_for_all(&self) -> String {
        let scores = self.scores.lock();
        if scores.is_empty() {
            return NOBODY_RANKED.to_string();
        }
        scores
            .iter()
            .map(|(member, score)| format!("{member} rankar: {score}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn feature(self: Arc<Self>) -> CallbackFeature {
        let parser = KeywordParser::new(CommandCategory::Ranking)
            .keywords(["rank", "ranks"])
            .composite("rank", ["alla", "all"], CommandSubcategory::RankingForAll)
            .composite("rank", ["ner", "ned", "down"], CommandSubcategory::RankingDown)
            .composite("rank", ["upp", "up"], CommandSubcategory::RankingUp)
            .words(["för", "for"], CommandSubcategory::RankingForMember);

        let up = Arc::clone(&self);
        let down = Arc::clone(&self);
        let member = Arc::clone(&self);
        let all = self;

        // Only eligible when the message carries no pronoun at all.
        CallbackFeature::builder("ranking", parser)
            .on_message(CommandSubcategory::RankingUp, move |message| {
                Ok(up.rank_up(message))
            })
            .on_message(CommandSubcategory::RankingDown, move |message| {
                Ok(down.rank_down(message))
            })
            .on_message(CommandSubcategory::RankingForMember, move |message| {
                Ok(member.rank_for_member(message))
            })
            .on(CommandSubcategory::RankingForAll, move || Ok(all.rank_for_all()))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use robbot_core::MessageContext;

    fn mentioning(members: &[&str]) -> Message {
        Message::parse(
            "rank",
            MessageContext::default().with_mentions(members.iter().copied()),
        )
    }

    #[test]
    fn ranks_go_up_and_down() {
        let rankings = Rankings::new();
        assert_eq!(rankings.rank_up(&mentioning(&["@olle"])), "@olle ökade till: 1");
        assert_eq!(
            rankings.rank_up(&mentioning(&["@olle", "@stina"])),
            "@olle ökade till: 2\n@stina ökade till: 1"
        );
        assert_eq!(rankings.score("@olle"), Some(2));
    }

    #[test]
    fn ranking_down_an_unknown_member_goes_negative() {
        let rankings = Rankings::new();
        assert_eq!(
            rankings.rank_down(&mentioning(&["@kalle"])),
            "@kalle minskade till: -1"
        );
    }

    #[test]
    fn lookups_report_unranked_members() {
        let rankings = Rankings::new();
        assert_eq!(rankings.rank_for_all(), NOBODY_RANKED);
        rankings.rank_up(&mentioning(&["@olle"]));
        assert_eq!(
            rankings.rank_for_member(&mentioning(&["@olle", "@stina"])),
            "@olle rankar: 1\n@stina har inte rankats"
        );
        assert_eq!(rankings.rank_for_all(), "@olle rankar: 1");
        assert_eq!(rankings.rank_up(&mentioning(&[])), NO_MENTIONS);
    }
}
