//! Article administration and newsletter composition
//!
//! Invalid forms are re-rendered with their errors and nothing is written.
//! Storage errors are not caught here; they propagate to the caller.

use chrono::Utc;
use std::sync::Arc;

use super::{ActionOutcome, ActionResult, ControllerError, ViewModel};
use crate::db::repositories::{
    ArticleRepository, CategoryRepository, NewsLetterRepository, SubscriberRepository,
};
use crate::models::{ArticleForm, CategoryRef, NewsLetterForm, ValidationErrors};
use crate::services::NewsletterDispatcher;

pub struct AdminController {
    articles: Arc<dyn ArticleRepository>,
    categories: Arc<dyn CategoryRepository>,
    newsletters: Arc<dyn NewsLetterRepository>,
    subscribers: Arc<dyn SubscriberRepository>,
    dispatcher: NewsletterDispatcher,
}

impl AdminController {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        categories: Arc<dyn CategoryRepository>,
        newsletters: Arc<dyn NewsLetterRepository>,
        subscribers: Arc<dyn SubscriberRepository>,
        dispatcher: NewsletterDispatcher,
    ) -> Self {
        Self {
            articles,
            categories,
            newsletters,
            subscribers,
            dispatcher,
        }
    }

    async fn article_form(
        &self,
        name: &'static str,
        form: ArticleForm,
        errors: ValidationErrors,
    ) -> ActionOutcome {
        let categories = self.categories.all().await?;
        Ok(ActionResult::view(
            name,
            ViewModel::ArticleForm {
                form,
                categories,
                errors,
            },
        ))
    }

    /// Selected categories that exist; unknown ids are dropped
    async fn category_refs(&self, ids: &[i64]) -> Result<Vec<CategoryRef>, ControllerError> {
        let categories = self.categories.find_many(ids).await?;
        Ok(categories.iter().map(|c| c.to_ref()).collect())
    }

    pub async fn index(&self) -> ActionOutcome {
        let articles = self.articles.all().await?;
        Ok(ActionResult::view("Index", ViewModel::Articles(articles)))
    }

    pub async fn details(&self, id: i64) -> ActionOutcome {
        Ok(match self.articles.find(id).await? {
            Some(article) => ActionResult::view("Details", ViewModel::Article(article)),
            None => ActionResult::NotFound,
        })
    }

    pub async fn create(&self) -> ActionOutcome {
        self.article_form("Create", ArticleForm::default(), ValidationErrors::new())
            .await
    }

    pub async fn create_post(&self, form: ArticleForm) -> ActionOutcome {
        let form = ArticleForm { id: 0, ..form };
        let categories = self.category_refs(&form.category_ids).await?;
        match form.clone().into_article(categories) {
            Ok(article) => {
                self.articles.add(article).await?;
                Ok(ActionResult::redirect("Index"))
            }
            Err(errors) => self.article_form("Create", form, errors).await,
        }
    }

    pub async fn edit(&self, id: i64) -> ActionOutcome {
        match self.articles.find(id).await? {
            Some(article) => {
                self.article_form("Edit", ArticleForm::from_article(&article), ValidationErrors::new())
                    .await
            }
            None => Ok(ActionResult::NotFound),
        }
    }

    /// Save the edited article `id`; an article that no longer exists is not found
    pub async fn edit_post(&self, id: i64, form: ArticleForm) -> ActionOutcome {
        let form = ArticleForm { id, ..form };
        let categories = self.category_refs(&form.category_ids).await?;
        let article = match form.clone().into_article(categories) {
            Ok(article) => article,
            Err(errors) => return self.article_form("Edit", form, errors).await,
        };

        if self.articles.find(id).await?.is_none() {
            return Ok(ActionResult::NotFound);
        }
        self.articles.update(article).await?;
        Ok(ActionResult::redirect("Index"))
    }

    pub async fn delete(&self, id: i64) -> ActionOutcome {
        Ok(match self.articles.find(id).await? {
            Some(article) => ActionResult::view("Delete", ViewModel::Article(article)),
            None => ActionResult::NotFound,
        })
    }

    /// Delete the article if it still exists; always back to the index
    pub async fn delete_confirmed(&self, id: i64) -> ActionOutcome {
        if let Some(article) = self.articles.find(id).await? {
            self.articles.delete(article).await?;
        }
        Ok(ActionResult::redirect("Index"))
    }

    pub fn create_newsletter(&self) -> ActionResult {
        ActionResult::view(
            "CreateNewsletter",
            ViewModel::NewsLetterForm {
                form: NewsLetterForm::default(),
                errors: ValidationErrors::new(),
            },
        )
    }

    /// Store the newsletter, then mail it to every current subscriber
    pub async fn create_newsletter_post(&self, form: NewsLetterForm) -> ActionOutcome {
        let errors = form.validate();
        if !errors.is_valid() {
            return Ok(ActionResult::view(
                "CreateNewsletter",
                ViewModel::NewsLetterForm { form, errors },
            ));
        }

        let newsletter = self.newsletters.add(form.into_newsletter(Utc::now())).await?;
        let subscribers = self.subscribers.all().await?;
        let report = self.dispatcher.dispatch(&newsletter, &subscribers).await;

        Ok(ActionResult::view(
            "NewsletterSent",
            ViewModel::NewsletterSent { newsletter, report },
        ))
    }
}
