use serde::{Deserialize, Serialize};

use crate::post::{PostReference, PostType};

/// An eligible entrant in a campaign's rotation pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub username: String,
    /// Empty when the operator did not supply a profile link.
    pub profile_url: String,
    pub comment: String,
}

impl Winner {
    /// Identity used for rotation fingerprints: `username-profileUrl`.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("{}-{}", self.username, self.profile_url)
    }
}

/// A recent commenter shown for context; never part of the rotation pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub username: String,
    pub comment: String,
}

/// A giveaway campaign bound to one Instagram post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub shortcode: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub canonical_url: String,
    pub embed_url: String,
    pub winners: Vec<Winner>,
    pub recent: Vec<RecentEntry>,
    pub comments_count: u64,
}

impl Campaign {
    /// Builds a campaign for `post`.
    ///
    /// A `comments_count` of zero falls back to the number of winners, since
    /// operators often leave the count cell blank.
    #[must_use]
    pub fn from_post(
        post: PostReference,
        winners: Vec<Winner>,
        recent: Vec<RecentEntry>,
        comments_count: u64,
    ) -> Self {
        let comments_count = if comments_count == 0 {
            winners.len() as u64
        } else {
            comments_count
        };
        Self {
            shortcode: post.shortcode,
            post_type: post.post_type,
            canonical_url: post.canonical_url,
            embed_url: post.embed_url,
            winners,
            recent,
            comments_count,
        }
    }

    /// A campaign may only be stored with a shortcode and at least one winner.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.shortcode.is_empty() && !self.winners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(name: &str) -> Winner {
        Winner {
            username: name.to_owned(),
            profile_url: format!("https://www.instagram.com/{name}/"),
            comment: String::new(),
        }
    }

    #[test]
    fn zero_count_defaults_to_winner_count() {
        let post = PostReference::new(PostType::Reel, "R1");
        let campaign = Campaign::from_post(post, vec![winner("a"), winner("b")], vec![], 0);
        assert_eq!(campaign.comments_count, 2);
    }

    #[test]
    fn explicit_count_is_kept() {
        let post = PostReference::new(PostType::Photo, "P1");
        let campaign = Campaign::from_post(post, vec![winner("a")], vec![], 1_234);
        assert_eq!(campaign.comments_count, 1_234);
        assert_eq!(campaign.canonical_url, "https://www.instagram.com/p/P1/");
    }

    #[test]
    fn campaign_without_winners_is_invalid() {
        let post = PostReference::new(PostType::Reel, "R1");
        let mut campaign = Campaign::from_post(post, vec![], vec![], 0);
        assert!(!campaign.is_valid());
        campaign.winners.push(winner("a"));
        assert!(campaign.is_valid());
        campaign.shortcode.clear();
        assert!(!campaign.is_valid());
    }

    #[test]
    fn identity_joins_username_and_profile() {
        assert_eq!(winner("anna").identity(), "anna-https://www.instagram.com/anna/");
    }
}
