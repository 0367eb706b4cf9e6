use tracing::instrument;

use super::filters::{ByOffer, OfferFilter};
use super::resource_client::ResourceClient;
use super::transaction_client::TransactionClient;
use crate::framework::Result;
use crate::model::{Offer, OfferComment, OfferItem};

resource_client!(
    /// Client for offers.
    Offer,
    filter = OfferFilter
);

impl TransactionClient<Offer> for OfferClient {}

impl OfferClient {
    #[instrument(skip(self))]
    pub async fn items(&self, id: i64) -> Result<Vec<OfferItem>> {
        OfferItemClient::from_mapper(self.mapper.sibling())
            .find_all(&ByOffer { offer_id: Some(id) })
            .await
    }

    #[instrument(skip(self))]
    pub async fn comments(&self, id: i64) -> Result<Vec<OfferComment>> {
        OfferCommentClient::from_mapper(self.mapper.sibling())
            .find_all(&ByOffer { offer_id: Some(id) })
            .await
    }
}

resource_client!(
    /// Client for offer positions.
    OfferItem,
    filter = ByOffer
);

resource_client!(
    /// Client for offer comments. Comments cannot be edited.
    OfferComment,
    filter = ByOffer
);
