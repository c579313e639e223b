//! Headless host fixtures shared by runtime unit tests.

use std::{cell::RefCell, rc::Rc, time::Duration};

use futures::{
    channel::oneshot,
    executor::LocalPool,
    future::LocalBoxFuture,
    FutureExt,
};
use platform_host::{
    HostCapabilities, HostServices, HostStrategy, ManualClock, MediaHandle, MemoryDocumentTitle,
    MemoryDurableStore, MemoryMediaHandle, Sleeper,
};

/// Sleeper whose timeouts resolve only when the test fires them.
#[derive(Clone, Default)]
pub(crate) struct ManualSleeper {
    pending: Rc<RefCell<Vec<oneshot::Sender<()>>>>,
}

impl ManualSleeper {
    pub(crate) fn fire_all(&self) {
        for sender in self.pending.borrow_mut().drain(..) {
            let _ = sender.send(());
        }
    }
}

impl Sleeper for ManualSleeper {
    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push(tx);
        rx.map(|_| ()).boxed_local()
    }
}

pub(crate) struct TestHost {
    pub services: HostServices,
    pub store: MemoryDurableStore,
    pub clock: ManualClock,
    pub sleeper: ManualSleeper,
    pub title: MemoryDocumentTitle,
    /// Standalone handle for tests that drive a media core directly.
    pub media: MemoryMediaHandle,
    created: Rc<RefCell<Vec<MemoryMediaHandle>>>,
    pool: RefCell<LocalPool>,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        Self::with_store(MemoryDurableStore::default())
    }

    pub(crate) fn with_store(store: MemoryDurableStore) -> Self {
        let pool = LocalPool::new();
        let clock = ManualClock::starting_at(1_700_000_000_000);
        let sleeper = ManualSleeper::default();
        let title = MemoryDocumentTitle::default();
        let created = Rc::new(RefCell::new(Vec::<MemoryMediaHandle>::new()));
        let services = HostServices {
            store: Rc::new(store.clone()),
            document_title: Rc::new(title.clone()),
            media_factory: Rc::new({
                let created = created.clone();
                move || {
                    let handle = MemoryMediaHandle::default();
                    created.borrow_mut().push(handle.clone());
                    Rc::new(handle) as Rc<dyn MediaHandle>
                }
            }),
            clock: Rc::new(clock.clone()),
            sleeper: Rc::new(sleeper.clone()),
            spawner: Rc::new(pool.spawner()),
            capabilities: HostCapabilities::headless(),
            host_strategy: HostStrategy::Headless,
        };
        Self {
            services,
            store,
            clock,
            sleeper,
            title,
            media: MemoryMediaHandle::default(),
            created,
            pool: RefCell::new(pool),
        }
    }

    /// Runs spawned tasks until none can make progress.
    pub(crate) fn run(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Returns the `index`-th handle handed out by the media factory.
    pub(crate) fn created_media(&self, index: usize) -> MemoryMediaHandle {
        self.created.borrow()[index].clone()
    }
}
