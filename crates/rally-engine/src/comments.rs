//! Comments, replies and likes on an activity.

use rally_core::{
  Violation,
  comment::{
    COMMENT_MAX_CHARS, Comment, REPLY_MAX_CHARS, Reply, check_content,
  },
  store::{Collection, CollectionStore},
  user::Principal,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{Engine, Result, activities::position, views::CommentView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
  pub liked:       bool,
  pub likes_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentStats {
  pub total_comments:     usize,
  pub total_replies:      usize,
  pub total_likes:        usize,
  pub total_interactions: usize,
}

fn comment_mut(
  comments: &mut [Comment],
  comment_id: Uuid,
) -> Result<&mut Comment> {
  comments
    .iter_mut()
    .find(|c| c.id == comment_id)
    .ok_or_else(|| Violation::not_found(format!("comment {comment_id} not found")).into())
}

impl<S: CollectionStore> Engine<S> {
  pub async fn add_comment(
    &self,
    activity_id: Uuid,
    content: &str,
    principal: &Principal,
  ) -> Result<Comment> {
    let content = check_content("comment", content, COMMENT_MAX_CHARS)?;

    let _activities_guard = self.locks.activities.lock().await;
    let _comments_guard = self.locks.comments.lock().await;
    position(&self.activities().await?, activity_id)?;

    let comment = Comment {
      id: Uuid::new_v4(),
      activity_id,
      author_id: principal.user_id,
      content,
      create_time: self.now(),
      likes: Vec::new(),
      replies: Vec::new(),
    };

    let mut book = self.comment_book().await?;
    book.entry(activity_id).or_default().push(comment.clone());
    self.save(Collection::Comments, &book).await?;

    info!(%activity_id, comment_id = %comment.id, "comment added");
    Ok(comment)
  }

  /// Author only.
  pub async fn delete_comment(
    &self,
    activity_id: Uuid,
    comment_id: Uuid,
    principal: &Principal,
  ) -> Result<()> {
    let _guard = self.locks.comments.lock().await;
    let mut book = self.comment_book().await?;
    let comments = book.entry(activity_id).or_default();

    if comment_mut(comments, comment_id)?.author_id != principal.user_id {
      return Err(
        Violation::unauthorized("only the author can delete this comment").into(),
      );
    }
    comments.retain(|c| c.id != comment_id);
    self.save(Collection::Comments, &book).await?;

    info!(%activity_id, %comment_id, "comment deleted");
    Ok(())
  }

  /// Like the comment, or take the like back if `principal` already liked
  /// it.
  pub async fn toggle_like(
    &self,
    activity_id: Uuid,
    comment_id: Uuid,
    principal: &Principal,
  ) -> Result<LikeOutcome> {
    let _guard = self.locks.comments.lock().await;
    let mut book = self.comment_book().await?;
    let comment = comment_mut(book.entry(activity_id).or_default(), comment_id)?;

    let liked = comment.toggle_like(principal.user_id);
    let outcome = LikeOutcome { liked, likes_count: comment.likes.len() };
    self.save(Collection::Comments, &book).await?;
    Ok(outcome)
  }

  pub async fn add_reply(
    &self,
    activity_id: Uuid,
    comment_id: Uuid,
    content: &str,
    principal: &Principal,
  ) -> Result<Reply> {
    let content = check_content("reply", content, REPLY_MAX_CHARS)?;

    let _guard = self.locks.comments.lock().await;
    let mut book = self.comment_book().await?;
    let comment = comment_mut(book.entry(activity_id).or_default(), comment_id)?;

    let reply = Reply {
      id: Uuid::new_v4(),
      author_id: principal.user_id,
      content,
      create_time: self.now(),
    };
    comment.replies.push(reply.clone());
    self.save(Collection::Comments, &book).await?;

    info!(%activity_id, %comment_id, reply_id = %reply.id, "reply added");
    Ok(reply)
  }

  /// An activity's comments, newest first.
  pub async fn comments(&self, activity_id: Uuid) -> Result<Vec<CommentView>> {
    let mut book = self.comment_book().await?;
    let directory = self.directory().await?;

    let mut views: Vec<CommentView> = book
      .remove(&activity_id)
      .unwrap_or_default()
      .into_iter()
      .map(|c| CommentView::project(c, &directory))
      .collect();
    views.sort_by(|a, b| b.comment.create_time.cmp(&a.comment.create_time));
    Ok(views)
  }

  pub async fn comment_stats(&self, activity_id: Uuid) -> Result<CommentStats> {
    let book = self.comment_book().await?;
    let Some(comments) = book.get(&activity_id) else {
      return Ok(CommentStats::default());
    };

    let total_comments = comments.len();
    let total_replies = comments.iter().map(|c| c.replies.len()).sum::<usize>();
    let total_likes = comments.iter().map(|c| c.likes.len()).sum::<usize>();
    Ok(CommentStats {
      total_comments,
      total_replies,
      total_likes,
      total_interactions: total_comments + total_replies + total_likes,
    })
  }
}
