//! Conversion from Reddit wire types to provider-neutral raw items.

use subpulse_core::{RawComment, RawItem};

use crate::types::{CommentData, PostData};

const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

pub(crate) fn post_to_raw_item(data: PostData) -> RawItem {
    let url = match (data.url, data.permalink) {
        (Some(url), _) if !url.trim().is_empty() => url,
        (_, Some(permalink)) => format!("{REDDIT_WEB_BASE}{permalink}"),
        _ => String::new(),
    };

    RawItem {
        id: data.id.unwrap_or_default(),
        title: data.title,
        score: data.score.unwrap_or(0),
        num_comments: data.num_comments.unwrap_or(0),
        upvote_ratio: data.upvote_ratio,
        url,
        author: data.author,
        created_utc: data.created_utc,
        selftext: data.selftext,
    }
}

pub(crate) fn comment_to_raw(data: CommentData) -> RawComment {
    RawComment {
        id: data.id.unwrap_or_default(),
        author: data.author,
        body: data.body,
        score: data.score.unwrap_or(0),
        created_utc: data.created_utc,
    }
}
