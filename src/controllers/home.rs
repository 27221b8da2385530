//! Visitor-facing pages: front page, article pages, category summary and archive

use std::sync::Arc;

use super::{ActionOutcome, ActionResult, ViewModel};
use crate::db::repositories::{ArticleRepository, DEFAULT_SEARCH_TERM};

pub struct HomeController {
    articles: Arc<dyn ArticleRepository>,
}

impl HomeController {
    pub fn new(articles: Arc<dyn ArticleRepository>) -> Self {
        Self { articles }
    }

    pub async fn index(&self) -> ActionOutcome {
        let articles = self.articles.all().await?;
        Ok(ActionResult::view("Index", ViewModel::Articles(articles)))
    }

    pub fn about(&self) -> ActionResult {
        ActionResult::view("About", ViewModel::Empty)
    }

    pub fn contact(&self) -> ActionResult {
        ActionResult::view("Contact", ViewModel::Empty)
    }

    pub async fn article_details(&self, id: i64) -> ActionOutcome {
        Ok(match self.articles.find(id).await? {
            Some(article) => ActionResult::view("ArticleDetails", ViewModel::Article(article)),
            None => ActionResult::NotFound,
        })
    }

    /// Articles in one category; no term means every article
    pub async fn article_summary(&self, search_term: Option<&str>) -> ActionOutcome {
        let term = search_term.unwrap_or(DEFAULT_SEARCH_TERM);
        let articles = self.articles.articles_by_category(term).await?;
        Ok(ActionResult::view("ArticleSummary", ViewModel::Articles(articles)))
    }

    pub async fn archive(&self) -> ActionOutcome {
        let groups = self.articles.articles_grouped_by_year().await?;
        Ok(ActionResult::view("Archive", ViewModel::Archive(groups)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::DbArticleRepository;
    use crate::db::{share, InMemoryDataContext, ModelSchema};
    use crate::models::{Article, Category};
    use chrono::{TimeZone, Utc};

    async fn seeded() -> (HomeController, Article, Article) {
        let context = share(InMemoryDataContext::new(Arc::new(ModelSchema::article_site())));
        let rust = crate::db::repositories::insert(&context, Category::new("Rust"))
            .await
            .unwrap();
        let repo = DbArticleRepository::new(context);

        let older = repo
            .add(
                Article::new("Older", "Body", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
                    .with_categories(vec![rust.to_ref()]),
            )
            .await
            .unwrap();
        let newer = repo
            .add(Article::new("Newer", "Body", Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()))
            .await
            .unwrap();

        (HomeController::new(Arc::new(repo)), older, newer)
    }

    #[tokio::test]
    async fn test_index_lists_newest_first() {
        let (home, older, newer) = seeded().await;
        let result = home.index().await.unwrap();

        assert_eq!(result.view_name(), Some("Index"));
        assert_eq!(result.model(), Some(&ViewModel::Articles(vec![newer, older])));
    }

    #[tokio::test]
    async fn test_article_details() {
        let (home, older, _) = seeded().await;

        let found = home.article_details(older.id).await.unwrap();
        assert_eq!(found.model(), Some(&ViewModel::Article(older)));
        assert!(home.article_details(999).await.unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_summary_defaults_to_every_article() {
        let (home, older, newer) = seeded().await;

        let all = home.article_summary(None).await.unwrap();
        assert_eq!(all.model(), Some(&ViewModel::Articles(vec![newer, older.clone()])));

        let rust = home.article_summary(Some("rust")).await.unwrap();
        assert_eq!(rust.model(), Some(&ViewModel::Articles(vec![older])));

        let none = home.article_summary(Some("cooking")).await.unwrap();
        assert_eq!(none.model(), Some(&ViewModel::Articles(vec![])));
    }

    #[tokio::test]
    async fn test_archive_and_static_pages() {
        let (home, _, _) = seeded().await;

        let archive = home.archive().await.unwrap();
        match archive.model() {
            Some(ViewModel::Archive(groups)) => {
                let years: Vec<i32> = groups.iter().map(|g| g.year).collect();
                assert_eq!(years, vec![2023, 2020]);
            }
            other => panic!("unexpected model {:?}", other),
        }

        assert_eq!(home.about().view_name(), Some("About"));
        assert_eq!(home.contact().model(), Some(&ViewModel::Empty));
    }
}
