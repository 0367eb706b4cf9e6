use super::filters::ArticleFilter;
use crate::model::{Article, Unit};

resource_client!(
    /// Client for catalogue articles.
    Article,
    filter = ArticleFilter
);

resource_client!(
    /// Client for units of measure.
    Unit,
    filter = ()
);
