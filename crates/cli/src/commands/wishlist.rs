//! Wishlist commands.

use legora_core::{LineSelector, WishlistItem};
use legora_storefront::persistence::KeyValueStore;
use legora_storefront::session::WishlistStore;

use super::Context;

fn report<S: KeyValueStore>(wishlist: &WishlistStore<S>) {
    for item in wishlist.items() {
        match &item.size {
            Some(size) => tracing::info!("  {} ({size}) - {}", item.title, item.price),
            None => tracing::info!("  {} - {}", item.title, item.price),
        }
    }
    tracing::info!("{} saved item(s)", wishlist.count());
}

pub fn show(ctx: &Context) {
    report(&ctx.session().wishlist);
}

pub fn add(ctx: &Context, item: WishlistItem) {
    let mut session = ctx.session();
    let title = item.title.clone();
    if session.wishlist.add_item(item) {
        tracing::info!("Saved {title}");
    } else {
        tracing::info!("{title} is already on your wishlist");
    }
    report(&session.wishlist);
}

pub fn remove(ctx: &Context, selector: &LineSelector) {
    let mut session = ctx.session();
    session.wishlist.remove_item(selector);
    report(&session.wishlist);
}

pub fn clear(ctx: &Context) {
    let mut session = ctx.session();
    session.wishlist.clear();
    tracing::info!("Wishlist cleared");
}
