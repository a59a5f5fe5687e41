use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow, Label, Overlay, Popover, Revealer};

use crate::config::{self, PortalConfig};
use crate::error::AppResult;
use crate::notification;
use crate::pins::{AddOutcome, DropSide, Pin, PinStore};
use crate::portal::{self, PortalPage};
use crate::select::{ClassifyRejection, ClickOutcome, SelectionEngine};
use crate::storage::FileStore;
use crate::ui::{StyleTokens, LAYOUT_TOKENS};

mod bar;
mod css;
mod launcher;
mod page_view;

use self::css::install_runtime_css;

const APP_ID: &str = "io.github.ethereum13.pinshelf";
const STORAGE_FAILURE_NOTICE: &str = "儲存失敗，請重試 (Storage error)";

type RefreshSlot = Rc<RefCell<Option<Rc<dyn Fn()>>>>;

/// Shared orchestrator state handed to every surface. The UI mode flags
/// live here, mutated only through the functions in this module.
#[derive(Clone)]
pub(crate) struct PinContext {
    pub(crate) store: Rc<PinStore>,
    pub(crate) config: Rc<PortalConfig>,
    pub(crate) page: Rc<PortalPage>,
    pub(crate) engine: Rc<RefCell<SelectionEngine>>,
    pub(crate) editing_bar: Rc<Cell<bool>>,
    pub(crate) tokens: StyleTokens,
    menu_refresh: RefreshSlot,
    bar_refresh: RefreshSlot,
    header_sync: RefreshSlot,
    window: Rc<RefCell<Option<ApplicationWindow>>>,
    banner: Rc<RefCell<Option<Revealer>>>,
    toast_label: Rc<RefCell<Option<Label>>>,
    toast_generation: Rc<Cell<u32>>,
    pub(crate) menu_popover: Rc<RefCell<Option<Popover>>>,
    pub(crate) open_dropdown: Rc<RefCell<Option<Popover>>>,
    launcher_slot: Rc<RefCell<Option<gtk4::Box>>>,
}

impl PinContext {
    fn new(
        store: Rc<PinStore>,
        config: Rc<PortalConfig>,
        page: Rc<PortalPage>,
        engine: Rc<RefCell<SelectionEngine>>,
    ) -> Self {
        Self {
            store,
            config,
            page,
            engine,
            editing_bar: Rc::new(Cell::new(false)),
            tokens: LAYOUT_TOKENS,
            menu_refresh: Rc::new(RefCell::new(None)),
            bar_refresh: Rc::new(RefCell::new(None)),
            header_sync: Rc::new(RefCell::new(None)),
            window: Rc::new(RefCell::new(None)),
            banner: Rc::new(RefCell::new(None)),
            toast_label: Rc::new(RefCell::new(None)),
            toast_generation: Rc::new(Cell::new(0)),
            menu_popover: Rc::new(RefCell::new(None)),
            open_dropdown: Rc::new(RefCell::new(None)),
            launcher_slot: Rc::new(RefCell::new(None)),
        }
    }

    pub(crate) fn is_selecting(&self) -> bool {
        self.engine.borrow().is_selecting()
    }
}

/// A mutation is only complete once both surfaces have re-rendered from
/// the stored collection, so the menu list and the bar never diverge.
pub(crate) fn refresh_surfaces(ctx: &PinContext) {
    for slot in [&ctx.menu_refresh, &ctx.bar_refresh] {
        let refresh = slot.borrow().clone();
        if let Some(refresh) = refresh {
            refresh();
        }
    }
}

fn sync_headers(ctx: &PinContext) {
    let sync = ctx.header_sync.borrow().clone();
    if let Some(sync) = sync {
        sync();
    }
}

pub(crate) fn notify_user(ctx: &PinContext, message: &str) {
    tracing::info!(message, "user notice");
    notification::send(message);

    let Some(label) = ctx.toast_label.borrow().clone() else {
        return;
    };
    label.set_text(message);
    label.set_visible(true);

    let generation = ctx.toast_generation.get().wrapping_add(1);
    ctx.toast_generation.set(generation);
    let generations = ctx.toast_generation.clone();
    gtk4::glib::timeout_add_local_once(
        std::time::Duration::from_millis(u64::from(ctx.tokens.toast_duration_ms)),
        move || {
            if generations.get() == generation {
                label.set_visible(false);
            }
        },
    );
}

/// Enter/exit actions of the Selecting state: page cursor, instruction
/// banner, menu button styling, launcher menu autohide, and the
/// full-page highlight resync after the exit sweep.
fn apply_selection_ui(ctx: &PinContext) {
    let selecting = ctx.is_selecting();

    if let Some(window) = ctx.window.borrow().as_ref() {
        let cursor = if selecting { Some("crosshair") } else { None };
        window.set_cursor_from_name(cursor);
    }
    if let Some(banner) = ctx.banner.borrow().as_ref() {
        banner.set_reveal_child(selecting);
    }
    if let Some(popover) = ctx.menu_popover.borrow().as_ref() {
        // Keep the menu open through page clicks while picking.
        popover.set_autohide(!selecting);
    }

    sync_headers(ctx);
    launcher::render_menu(ctx);
}

pub(crate) fn run_toggle_selection(ctx: &PinContext) {
    let headers = ctx.page.headers();
    let result = ctx.engine.borrow_mut().toggle(&headers);
    match result {
        Ok(state) => tracing::info!(?state, "selection mode toggled"),
        Err(err) => {
            tracing::error!(%err, "selection toggle rejected");
            return;
        }
    }
    apply_selection_ui(ctx);
}

pub(crate) fn run_cancel_selection(ctx: &PinContext) {
    let headers = ctx.page.headers();
    if ctx.engine.borrow_mut().cancel(&headers).is_err() {
        return;
    }
    tracing::info!("selection mode cancelled");
    apply_selection_ui(ctx);
}

pub(crate) fn handle_click_outcome(ctx: &PinContext, outcome: ClickOutcome) {
    match outcome {
        ClickOutcome::NotSelecting | ClickOutcome::NotAHeader => {}
        ClickOutcome::Candidate(pin) => add_candidate(ctx, pin),
        ClickOutcome::Rejected(ClassifyRejection::NoSubmenu { name }) => {
            tracing::info!(%name, "group candidate without submenu links");
            notify_user(ctx, "無法偵測到子選單連結，請確認已展開該選單 (Please expand the menu first)");
        }
    }
}

fn add_candidate(ctx: &PinContext, pin: Pin) {
    let name = pin.name.clone();
    match ctx.store.add_pin(pin) {
        Ok(AddOutcome::Added) => {
            refresh_surfaces(ctx);
            notify_user(ctx, &format!("已釘選 Pinned \"{name}\"!"));
        }
        Ok(AddOutcome::Duplicate) => notify_user(ctx, "已經釘選過了 (Already pinned!)"),
        Err(err) => {
            tracing::error!(%err, "failed to persist pin");
            notify_user(ctx, STORAGE_FAILURE_NOTICE);
        }
    }
}

pub(crate) fn remove_pin(ctx: &PinContext, index: usize) {
    match ctx.store.remove_at(index) {
        Ok(_) => refresh_surfaces(ctx),
        Err(err) => {
            tracing::error!(%err, "failed to remove pin");
            notify_user(ctx, STORAGE_FAILURE_NOTICE);
        }
    }
}

pub(crate) fn apply_menu_reorder(ctx: &PinContext, from: usize, to: usize) {
    if from == to {
        return;
    }
    match ctx.store.move_pin(from, to) {
        Ok(_) => refresh_surfaces(ctx),
        Err(err) => {
            tracing::error!(%err, "failed to reorder pins");
            notify_user(ctx, STORAGE_FAILURE_NOTICE);
        }
    }
}

pub(crate) fn apply_bar_reorder(ctx: &PinContext, from: usize, target: usize, side: DropSide) {
    match ctx.store.move_pin_with_side(from, target, side) {
        Ok(_) => refresh_surfaces(ctx),
        Err(err) => {
            tracing::error!(%err, "failed to reorder bar pins");
            notify_user(ctx, STORAGE_FAILURE_NOTICE);
        }
    }
}

pub(crate) fn open_uri(uri: &str) {
    let launcher = gtk4::UriLauncher::new(uri);
    let uri = uri.to_string();
    launcher.launch(
        None::<&gtk4::Window>,
        None::<&gtk4::gio::Cancellable>,
        move |result| {
            if let Err(err) = result {
                tracing::warn!(%uri, %err, "failed to open shortcut target");
            }
        },
    );
}

pub struct App {
    engine: Option<Rc<RefCell<SelectionEngine>>>,
}

impl App {
    pub fn new() -> Self {
        Self { engine: None }
    }

    pub fn selection_state(&self) -> crate::select::SelectionState {
        self.engine
            .as_ref()
            .map(|engine| engine.borrow().state())
            .unwrap_or_default()
    }

    pub fn start(&mut self) -> AppResult<()> {
        let portal_config = Rc::new(config::load_portal_config());
        tracing::info!(
            marker = %portal_config.menu_page_marker,
            "loaded portal config"
        );

        let file_store = FileStore::with_default_paths()?;
        tracing::info!(root = %file_store.root().display(), "opened pin storage");
        let store = Rc::new(PinStore::new(Rc::new(file_store)));

        let page = Rc::new(PortalPage::from_snapshot(&portal::load_snapshot()));
        tracing::info!(headers = page.headers().len(), "materialized portal page");

        let engine = Rc::new(RefCell::new(SelectionEngine::new(
            portal_config.menu_page_marker.clone(),
        )));
        self.engine = Some(engine.clone());

        tracing::info!("starting gtk runtime");
        let application = Application::new(Some(APP_ID), gtk4::gio::ApplicationFlags::NON_UNIQUE);

        let ctx = PinContext::new(store, portal_config, page, engine.clone());
        let ctx_for_activate = ctx.clone();
        application.connect_activate(move |app| {
            build_runtime(app, &ctx_for_activate);
        });

        // Pass only argv[0] so our own CLI flags never reach GTK parsing.
        let args: Vec<String> = std::env::args().take(1).collect();
        application.run_with_args(&args);
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn build_runtime(app: &Application, ctx: &PinContext) {
    install_runtime_css(ctx.tokens);

    let window = ApplicationWindow::new(app);
    window.add_css_class("pinshelf-root");
    window.set_title(Some("Pinshelf"));
    window.set_default_size(900, 640);

    let root_overlay = Overlay::new();
    let (page_root, banner) = page_view::build_page_view(ctx);
    root_overlay.set_child(Some(&page_root));

    // Toast sits above everything, top center.
    let toast = Label::new(None);
    toast.add_css_class("pin-toast");
    toast.set_halign(gtk4::Align::Center);
    toast.set_valign(gtk4::Align::Start);
    toast.set_margin_top(ctx.tokens.spacing_16);
    toast.set_visible(false);
    root_overlay.add_overlay(&toast);

    *ctx.window.borrow_mut() = Some(window.clone());
    *ctx.banner.borrow_mut() = Some(banner);
    *ctx.toast_label.borrow_mut() = Some(toast);

    launcher::mount_launcher(ctx, &root_overlay);

    // Cancellation key for Selecting mode.
    let key_controller = gtk4::EventControllerKey::new();
    let ctx_for_key = ctx.clone();
    key_controller.connect_key_pressed(move |_, key, _code, _modifier| {
        if key == gtk4::gdk::Key::Escape && ctx_for_key.is_selecting() {
            run_cancel_selection(&ctx_for_key);
            return gtk4::glib::Propagation::Stop;
        }
        gtk4::glib::Propagation::Proceed
    });
    window.add_controller(key_controller);

    window.set_child(Some(&root_overlay));
    refresh_surfaces(ctx);
    tracing::info!("presenting portal window");
    window.present();
}
