//! Color palette: fixed defaults plus user-added colors.

use crate::color::Rgba;
use crate::storage::{CUSTOM_COLORS_KEY, KeyValueStore, StorageResult, load_json, save_json};

/// Colors every palette starts with.
pub const DEFAULT_COLORS: [Rgba; 5] = [
    Rgba::new(0x00, 0x00, 0x00, 0xff),
    Rgba::new(0xff, 0x00, 0x00, 0xff),
    Rgba::new(0x00, 0xff, 0x00, 0xff),
    Rgba::new(0x00, 0x00, 0xff, 0xff),
    Rgba::new(0xff, 0xff, 0x00, 0xff),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    custom: Vec<Rgba>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom(custom: Vec<Rgba>) -> Self {
        let mut palette = Self::new();
        for color in custom {
            palette.add(color);
        }
        palette
    }

    /// Defaults followed by custom colors, in insertion order.
    pub fn colors(&self) -> impl Iterator<Item = Rgba> + '_ {
        DEFAULT_COLORS.iter().copied().chain(self.custom.iter().copied())
    }

    pub fn custom(&self) -> &[Rgba] {
        &self.custom
    }

    /// Add a custom color. Returns false if it is already in the palette.
    pub fn add(&mut self, color: Rgba) -> bool {
        if self.colors().any(|c| c == color) {
            return false;
        }
        self.custom.push(color);
        true
    }

    pub async fn load<S: KeyValueStore + ?Sized>(store: &S) -> StorageResult<Self> {
        let custom: Vec<Rgba> = load_json(store, CUSTOM_COLORS_KEY).await?;
        Ok(Self::with_custom(custom))
    }

    pub async fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> StorageResult<()> {
        save_json(store, CUSTOM_COLORS_KEY, &self.custom).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    #[test]
    fn test_defaults_come_first() {
        let palette = Palette::new();
        let hex: Vec<String> = palette.colors().map(|c| c.to_hex()).collect();
        assert_eq!(hex, ["#000000", "#ff0000", "#00ff00", "#0000ff", "#ffff00"]);
    }

    #[test]
    fn test_add_ignores_duplicates() {
        let mut palette = Palette::new();
        assert!(palette.add(Rgba::new(0x12, 0x34, 0x56, 0xff)));
        assert!(!palette.add(Rgba::new(0x12, 0x34, 0x56, 0xff)));
        assert!(!palette.add(Rgba::black()));
        assert_eq!(palette.custom().len(), 1);
        assert_eq!(palette.colors().count(), 6);
    }

    #[test]
    fn test_persists_custom_colors_only() {
        let store = MemoryStore::new();
        let mut palette = Palette::new();
        palette.add(Rgba::new(0xab, 0xcd, 0xef, 0xff));
        block_on(palette.save(&store)).unwrap();

        assert_eq!(
            block_on(store.load(CUSTOM_COLORS_KEY)).unwrap().as_deref(),
            Some(r##"["#abcdef"]"##)
        );
        assert_eq!(block_on(Palette::load(&store)).unwrap(), palette);
    }
}
