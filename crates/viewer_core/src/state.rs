use tokio::sync::watch;

use shared::domain::{FactPayload, ImagePayload};

/// Combined presentation value derived from whatever the two cells currently
/// hold. Both sides start out empty and fill in independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatSnapshot {
    pub fact: Option<String>,
    pub image_url: Option<String>,
}

/// The two always-valued state cells plus the derived snapshot channel.
///
/// Cells are written only by the active fetch job. Every write recombines
/// both cells and republishes the snapshot, even when the derived value is
/// unchanged, so observers see one emission per write.
pub(crate) struct StateCells {
    fact: watch::Sender<Option<FactPayload>>,
    image: watch::Sender<Option<ImagePayload>>,
    combined: watch::Sender<CatSnapshot>,
}

impl StateCells {
    pub(crate) fn new() -> Self {
        let (fact, _) = watch::channel(None);
        let (image, _) = watch::channel(None);
        let (combined, _) = watch::channel(CatSnapshot::default());
        Self {
            fact,
            image,
            combined,
        }
    }

    pub(crate) fn set_fact(&self, fact: FactPayload) {
        self.fact.send_replace(Some(fact));
        self.recombine();
    }

    pub(crate) fn set_image(&self, image: ImagePayload) {
        self.image.send_replace(Some(image));
        self.recombine();
    }

    /// A fresh receiver immediately holds the current snapshot.
    pub(crate) fn subscribe(&self) -> watch::Receiver<CatSnapshot> {
        self.combined.subscribe()
    }

    pub(crate) fn snapshot(&self) -> CatSnapshot {
        self.combined.borrow().clone()
    }

    fn recombine(&self) {
        let snapshot = CatSnapshot {
            fact: self.fact.borrow().as_ref().map(|f| f.fact.clone()),
            image_url: self.image.borrow().as_ref().map(|i| i.url.clone()),
        };
        self.combined.send_replace(snapshot);
    }
}
