use crate::models::{
    CategorizedResult, Category, CoachingBot, Forum, KnowledgeBase, Newsletter, OutputBundle,
    SearchHit, Session, ToolVault, UserProfile, Workshops,
};

const NEWSLETTER_ITEMS: usize = 5;
const FORUM_TOPICS: usize = 3;
const WORKSHOP_MATERIALS: usize = 2;
const TOOL_KEYWORD: &str = "tool";

/// Derives every output view from one categorization
pub struct OutputProjector;

impl OutputProjector {
    pub fn project(
        categorized: &CategorizedResult,
        raw_hits: &[SearchHit],
        profiles: &[UserProfile],
    ) -> OutputBundle {
        OutputBundle {
            newsletter: Self::newsletter(categorized),
            tool_vault: Self::tool_vault(categorized),
            forum: Self::forum(raw_hits),
            coaching_bot: Self::coaching_bot(categorized, profiles),
            workshops: Self::workshops(categorized),
        }
    }

    /// Top snippets across all buckets
    pub fn newsletter(categorized: &CategorizedResult) -> Newsletter {
        Newsletter {
            content: categorized
                .flattened()
                .take(NEWSLETTER_ITEMS)
                .map(|hit| hit.snippet.clone())
                .collect(),
        }
    }

    /// Every hit whose snippet mentions a tool, in any case
    pub fn tool_vault(categorized: &CategorizedResult) -> ToolVault {
        ToolVault {
            updates: categorized
                .flattened()
                .filter(|hit| hit.snippet.to_lowercase().contains(TOOL_KEYWORD))
                .cloned()
                .collect(),
        }
    }

    /// Seeds forum topics from the uncategorized search order
    pub fn forum(raw_hits: &[SearchHit]) -> Forum {
        Forum {
            topics: raw_hits
                .iter()
                .take(FORUM_TOPICS)
                .map(|hit| hit.title.clone())
                .collect(),
        }
    }

    /// Per-category snippets, plus a personal copy for each profile whose
    /// interest names a category. Unknown interests are skipped.
    pub fn coaching_bot(categorized: &CategorizedResult, profiles: &[UserProfile]) -> CoachingBot {
        let mut knowledge_base = KnowledgeBase::new();
        for category in Category::ALL {
            knowledge_base.insert(
                category.as_str().to_string(),
                snippets(categorized.bucket(category)),
            );
        }

        for profile in profiles {
            if Category::from_label(&profile.interest).is_none() {
                tracing::debug!(
                    profile = %profile.id,
                    interest = %profile.interest,
                    "interest is not a category, skipping profile"
                );
                continue;
            }
            // Read the current entry: a profile whose id is a category label
            // may already have replaced it.
            let Some(copy) = knowledge_base.get(&profile.interest).cloned() else {
                continue;
            };
            knowledge_base.insert(profile.id.clone(), copy);
        }

        CoachingBot { knowledge_base }
    }

    /// One session outline per category, always in taxonomy order
    pub fn workshops(categorized: &CategorizedResult) -> Workshops {
        Workshops {
            sessions: Category::ALL
                .into_iter()
                .map(|category| Session {
                    theme: category,
                    materials: snippets(categorized.bucket(category))
                        .into_iter()
                        .take(WORKSHOP_MATERIALS)
                        .collect(),
                })
                .collect(),
        }
    }
}

fn snippets(hits: &[SearchHit]) -> Vec<String> {
    hits.iter().map(|hit| hit.snippet.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CategorizedResult {
        CategorizedResult {
            productivity: vec![
                SearchHit::new("P1", "Great tool for focus"),
                SearchHit::new("P2", "Batch your email"),
                SearchHit::new("P3", "Pomodoro TOOLS roundup"),
            ],
            health: vec![
                SearchHit::new("H1", "Sleep earlier"),
                SearchHit::new("H2", "Hydration tracker"),
            ],
            creativity: vec![
                SearchHit::new("C1", "Sketch daily"),
                SearchHit::new("C2", "Toolkit for writers"),
            ],
        }
    }

    fn raw() -> Vec<SearchHit> {
        vec![
            SearchHit::new("Raw 1", "a"),
            SearchHit::new("Raw 2", "b"),
            SearchHit::new("Raw 3", "c"),
            SearchHit::new("Raw 4", "d"),
        ]
    }

    // ==================== Newsletter ====================

    #[test]
    fn test_newsletter_takes_first_five_in_bucket_order() {
        let newsletter = OutputProjector::newsletter(&sample());
        assert_eq!(
            newsletter.content,
            vec![
                "Great tool for focus",
                "Batch your email",
                "Pomodoro TOOLS roundup",
                "Sleep earlier",
                "Hydration tracker",
            ]
        );
    }

    #[test]
    fn test_newsletter_shorter_than_five() {
        let mut categorized = CategorizedResult::empty();
        categorized.health.push(SearchHit::new("H", "only one"));
        assert_eq!(OutputProjector::newsletter(&categorized).content, vec!["only one"]);
    }

    #[test]
    fn test_newsletter_length_bounds() {
        let mut categorized = CategorizedResult::empty();
        for n in 0..9 {
            let newsletter = OutputProjector::newsletter(&categorized);
            assert!(newsletter.content.len() <= 5);
            assert!(newsletter.content.len() <= categorized.total_hits());
            let category = Category::ALL[n % 3];
            categorized
                .bucket_mut(category)
                .push(SearchHit::new(format!("t{n}"), format!("s{n}")));
        }
    }

    // ==================== Tool Vault ====================

    #[test]
    fn test_tool_vault_filters_case_insensitively() {
        let vault = OutputProjector::tool_vault(&sample());
        let titles: Vec<_> = vault.updates.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["P1", "P3", "C2"]);
        for hit in &vault.updates {
            assert!(hit.snippet.to_lowercase().contains("tool"));
        }
    }

    #[test]
    fn test_tool_vault_ignores_titles() {
        let mut categorized = CategorizedResult::empty();
        categorized.productivity.push(SearchHit::new("Best tool", "No match here"));
        assert!(OutputProjector::tool_vault(&categorized).updates.is_empty());
    }

    // ==================== Forum ====================

    #[test]
    fn test_forum_uses_raw_order() {
        assert_eq!(OutputProjector::forum(&raw()).topics, vec!["Raw 1", "Raw 2", "Raw 3"]);
        assert_eq!(OutputProjector::forum(&raw()[..1]).topics, vec!["Raw 1"]);
        assert!(OutputProjector::forum(&[]).topics.is_empty());
    }

    // ==================== Coaching Bot ====================

    #[test]
    fn test_coaching_bot_base_entries() {
        let bot = OutputProjector::coaching_bot(&sample(), &[]);
        let kb = &bot.knowledge_base;
        assert_eq!(kb.keys().collect::<Vec<_>>(), vec!["productivity", "health", "creativity"]);
        assert_eq!(kb["health"], ["Sleep earlier", "Hydration tracker"]);
    }

    #[test]
    fn test_coaching_bot_personalizes_matching_profiles() {
        let profiles = vec![
            UserProfile::new("alice", "health"),
            UserProfile::new("bob", "finance"),
            UserProfile::new("carol", "creativity"),
            UserProfile::new("dave", ""),
        ];
        let bot = OutputProjector::coaching_bot(&sample(), &profiles);
        let kb = &bot.knowledge_base;

        assert_eq!(kb.get("alice"), kb.get("health"));
        assert_eq!(kb.get("carol"), kb.get("creativity"));
        assert!(!kb.contains_key("bob"));
        assert!(!kb.contains_key("dave"));
        assert_eq!(kb.len(), 5);
    }

    #[test]
    fn test_coaching_bot_profile_entries_are_copies() {
        let profiles = vec![
            UserProfile::new("alice", "health"),
            UserProfile::new("health", "productivity"),
        ];
        let bot = OutputProjector::coaching_bot(&sample(), &profiles);
        let kb = &bot.knowledge_base;

        // The second profile overwrites the health entry; alice keeps her copy.
        assert_eq!(kb["alice"], ["Sleep earlier", "Hydration tracker"]);
        assert_eq!(kb.get("health"), kb.get("productivity"));
        assert_eq!(kb.keys().collect::<Vec<_>>(), vec!["productivity", "health", "creativity", "alice"]);
    }

    #[test]
    fn test_coaching_bot_skips_unreadable_interests() {
        let profiles: Vec<UserProfile> = serde_json::from_value(json!([
            {"id": "gina", "interest": null},
            {"id": "hank", "interest": 7},
            {"id": "ivy", "interest": "health"}
        ]))
        .unwrap();
        let bot = OutputProjector::coaching_bot(&sample(), &profiles);
        let kb = &bot.knowledge_base;

        assert!(!kb.contains_key("gina"));
        assert!(!kb.contains_key("hank"));
        assert_eq!(kb.get("ivy"), kb.get("health"));
        assert_eq!(kb.len(), 4);
    }

    #[test]
    fn test_coaching_bot_interest_must_match_exactly() {
        let profiles = vec![UserProfile::new("erin", "Health")];
        let bot = OutputProjector::coaching_bot(&sample(), &profiles);
        assert!(!bot.knowledge_base.contains_key("erin"));
    }

    #[test]
    fn test_coaching_bot_interest_naming_profile_id_is_ignored() {
        let profiles = vec![
            UserProfile::new("alice", "health"),
            UserProfile::new("frank", "alice"),
        ];
        let bot = OutputProjector::coaching_bot(&sample(), &profiles);
        assert!(!bot.knowledge_base.contains_key("frank"));
    }

    // ==================== Workshops ====================

    #[test]
    fn test_workshops_one_session_per_category() {
        let mut categorized = sample();
        categorized.creativity.clear();
        let workshops = OutputProjector::workshops(&categorized);

        assert_eq!(workshops.sessions.len(), 3);
        assert_eq!(workshops.sessions[0].theme, Category::Productivity);
        assert_eq!(workshops.sessions[0].materials, vec!["Great tool for focus", "Batch your email"]);
        assert_eq!(workshops.sessions[1].materials.len(), 2);
        assert_eq!(workshops.sessions[2].theme, Category::Creativity);
        assert!(workshops.sessions[2].materials.is_empty());
    }

    // ==================== Whole bundle ====================

    #[test]
    fn test_empty_input_produces_degenerate_bundle() {
        let bundle = OutputProjector::project(&CategorizedResult::empty(), &[], &[]);
        assert_eq!(
            serde_json::to_value(&bundle).unwrap(),
            json!({
                "newsletter": {"content": []},
                "tool_vault": {"updates": []},
                "forum": {"topics": []},
                "coaching_bot": {"knowledge_base": {"productivity": [], "health": [], "creativity": []}},
                "workshops": {"sessions": [
                    {"theme": "productivity", "materials": []},
                    {"theme": "health", "materials": []},
                    {"theme": "creativity", "materials": []}
                ]}
            })
        );
    }

    #[test]
    fn test_single_tool_hit() {
        let hit = SearchHit::new("X", "Great tool for focus");
        let mut categorized = CategorizedResult::empty();
        categorized.productivity.push(hit.clone());

        let bundle = OutputProjector::project(&categorized, &[hit.clone()], &[]);

        assert_eq!(bundle.tool_vault.updates, vec![hit]);
        assert_eq!(bundle.newsletter.content, vec!["Great tool for focus"]);
        assert_eq!(bundle.forum.topics, vec!["X"]);
    }
}
