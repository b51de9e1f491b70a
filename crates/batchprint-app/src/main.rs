// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// batchprint — drop PDFs in a list and print them one after another.
//
// Entry point. Loads the config, initialises logging, starts the queue
// coordinator on its own tokio runtime, and launches the Dioxus UI.

mod pages;
mod services;
mod state;

use std::sync::OnceLock;

use dioxus::prelude::*;
use tokio::sync::broadcast::error::RecvError;

use batchprint_core::types::Notice;
use batchprint_print::QueueEvent;

use pages::print_list::PrintList;
use pages::settings::Settings;
use services::app_services::{AppServices, load_config};
use services::{data_dir, dialogs};
use state::AppState;

/// Services are created before the UI starts, on the queue runtime.
static SERVICES: OnceLock<AppServices> = OnceLock::new();

fn main() {
    let dir = data_dir::data_dir();
    let stored = load_config(&dir);
    let config = stored.clone().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!("batchprint starting");
    if stored.is_none() {
        tracing::info!(path = %dir.display(), "no usable config file; using defaults");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("batchprint-queue")
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "could not start the queue runtime");
            std::process::exit(1);
        }
    };

    let services = {
        let _guard = runtime.enter();
        AppServices::init(config, dir)
    };
    if SERVICES.set(services).is_err() {
        tracing::warn!("app services were already initialised");
    }

    dioxus::launch(app);

    runtime.shutdown_background();
}

/// Root component.
fn app() -> Element {
    let Some(svc) = SERVICES.get().cloned() else {
        return rsx! { p { "The print queue could not be started." } };
    };

    use_context_provider(|| svc.clone());
    let mut state = use_context_provider(|| Signal::new(AppState::new(&svc)));
    let mut show_settings = use_signal(|| false);

    // Mirror coordinator events into the UI state.
    let queue = svc.queue().clone();
    use_future(move || {
        let queue = queue.clone();
        async move {
            let mut events = queue.subscribe();
            loop {
                match events.recv().await {
                    Ok(QueueEvent::Notice(Notice::ConfigurationCancelled)) => {
                        tracing::debug!("configuration dialog dismissed");
                    }
                    Ok(QueueEvent::Notice(notice)) => dialogs::show_notice(notice).await,
                    Ok(event) => state.write().apply(&event),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "UI fell behind the queue; resyncing");
                        match queue.snapshot().await {
                            Ok(snapshot) => state.write().resync(snapshot),
                            Err(e) => tracing::error!(error = %e, "resync failed"),
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::warn!("queue event stream closed");
                        break;
                    }
                }
            }
        }
    });

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; height: 100vh; font-family: system-ui, -apple-system, sans-serif;",

            div { class: "page-content",
                style: "flex: 1; overflow-y: auto; padding: 16px;",
                if *show_settings.read() {
                    Settings {}
                } else {
                    PrintList {}
                }
            }

            nav { class: "tab-bar",
                style: "display: flex; justify-content: space-around; padding: 8px 0; border-top: 1px solid #e0e0e0; background: #fafafa;",
                TabButton {
                    label: "Print",
                    active: !*show_settings.read(),
                    on_select: move |_| show_settings.set(false),
                }
                TabButton {
                    label: "Settings",
                    active: *show_settings.read(),
                    on_select: move |_| show_settings.set(true),
                }
            }
        }
    }
}

#[component]
fn TabButton(label: &'static str, active: bool, on_select: EventHandler<()>) -> Element {
    let weight = if active { "bold" } else { "normal" };
    rsx! {
        button {
            style: "border: none; background: none; color: #333; font-size: 14px; font-weight: {weight};",
            onclick: move |_| on_select.call(()),
            "{label}"
        }
    }
}
