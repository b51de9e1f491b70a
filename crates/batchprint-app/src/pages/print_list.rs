// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print list page — add PDFs, tick the ones to print, pick a printer, and
// print them one after another.

use std::path::PathBuf;

use dioxus::prelude::*;

use batchprint_core::human_errors::humanize_error;
use batchprint_core::types::ItemStatus;
use batchprint_print::StartOutcome;

use crate::services::app_services::AppServices;
use crate::services::dialogs;
use crate::state::AppState;

const BUTTON_STYLE: &str = "padding: 8px 16px; border-radius: 6px; border: 1px solid #ccc; background: white; font-size: 14px;";

#[component]
pub fn PrintList() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let controls = state.read().controls();
    let mut drag_over = use_signal(|| false);
    let drop_border = if *drag_over.read() { "#007aff" } else { "#ddd" };

    rsx! {
        div {
            h1 { "Batch Print" }

            // File list; files dropped anywhere on it are added.
            section { style: "margin: 16px 0;",
                ondragover: move |evt| {
                    evt.prevent_default();
                    drag_over.set(true);
                },
                ondragleave: move |_| drag_over.set(false),
                ondrop: {
                    let svc = svc.clone();
                    move |evt: DragEvent| {
                        evt.prevent_default();
                        drag_over.set(false);
                        let paths = dropped_paths(evt.files().iter().map(|f| f.path()));
                        if paths.is_empty() {
                            return;
                        }
                        let svc = svc.clone();
                        spawn(async move {
                            match svc.queue().add_paths(paths).await {
                                Ok(added) => tracing::debug!(added, "files dropped"),
                                Err(e) => tracing::error!(error = %e, "could not add dropped files"),
                            }
                        });
                    }
                },
                if state.read().items.is_empty() {
                    p { style: "color: #888; padding: 24px; border: 2px dashed {drop_border}; border-radius: 8px; text-align: center;",
                        "Drop PDF files here or use Add Files..."
                    }
                } else {
                    table { style: "width: 100%; border-collapse: collapse;",
                        thead {
                            tr { style: "text-align: left; border-bottom: 1px solid #e0e0e0;",
                                th { style: "width: 32px;", "" }
                                th { "File" }
                                th { style: "width: 120px;", "Status" }
                            }
                        }
                        tbody {
                            for (index, item) in state.read().items.iter().enumerate() {
                                FileRow {
                                    key: "{index}",
                                    index,
                                    name: item.display_name(),
                                    selected: item.selected,
                                    status: item.status,
                                }
                            }
                        }
                    }
                }
                button {
                    style: "{BUTTON_STYLE} margin-top: 8px;",
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let Some(paths) = pick_pdfs() else {
                                return;
                            };
                            let svc = svc.clone();
                            spawn(async move {
                                match svc.queue().add_paths(paths).await {
                                    Ok(added) => tracing::debug!(added, "files picked"),
                                    Err(e) => tracing::error!(error = %e, "could not add files"),
                                }
                            });
                        }
                    },
                    "Add Files..."
                }
            }

            // Printer selection
            section { style: "margin: 16px 0; display: flex; align-items: center; gap: 8px;",
                label { "Printer:" }
                if state.read().printers.is_empty() {
                    span { style: "color: #888;", "No printers are installed." }
                } else {
                    select {
                        style: "flex: 1; padding: 6px; font-size: 14px; border-radius: 6px; border: 1px solid #ccc;",
                        disabled: !controls.print_enabled,
                        onchange: move |evt| {
                            let val = evt.value();
                            state.write().selected_printer = (!val.is_empty()).then_some(val);
                        },
                        if state.read().selected_printer.is_none() {
                            option { value: "", selected: true, "Choose a printer..." }
                        }
                        for printer in state.read().printers.iter() {
                            option {
                                value: "{printer}",
                                selected: state.read().selected_printer.as_deref() == Some(printer.as_str()),
                                "{printer}"
                            }
                        }
                    }
                }
            }

            // Actions
            div { style: "display: flex; gap: 8px; flex-wrap: wrap;",
                button {
                    style: "{BUTTON_STYLE} border-color: #007aff; background: #007aff; color: white;",
                    disabled: !controls.print_enabled,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            if state.read().start_pending {
                                return;
                            }
                            let printer = state.read().selected_printer.clone().unwrap_or_default();
                            state.write().start_pending = true;
                            let svc = svc.clone();
                            spawn(async move {
                                let result = svc.print(printer).await;
                                state.write().start_pending = false;
                                match result {
                                    Ok(StartOutcome::Started(run_id)) => {
                                        tracing::debug!(run_id = %run_id, "run started from the UI");
                                    }
                                    // Reported through the notice stream.
                                    Ok(StartOutcome::NothingSelected | StartOutcome::Cancelled) => {}
                                    Err(e) => {
                                        tracing::warn!(error = %e, "print could not start");
                                        dialogs::show_error(humanize_error(&e)).await;
                                    }
                                }
                            });
                        }
                    },
                    "{controls.print_label}"
                }
                button {
                    style: BUTTON_STYLE,
                    disabled: !controls.stop_enabled,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let svc = svc.clone();
                            spawn(async move {
                                if let Err(e) = svc.queue().request_stop().await {
                                    tracing::error!(error = %e, "stop request failed");
                                }
                            });
                        }
                    },
                    "{controls.stop_label}"
                }
                button {
                    style: BUTTON_STYLE,
                    disabled: !controls.remove_deselected_enabled,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let svc = svc.clone();
                            spawn(async move {
                                if svc.config().confirm_destructive_actions
                                    && !dialogs::confirm("Remove all files that are not ticked from the list?").await
                                {
                                    return;
                                }
                                if let Err(e) = svc.queue().remove_unselected().await {
                                    dialogs::show_error(humanize_error(&e)).await;
                                }
                            });
                        }
                    },
                    "Remove Deselected"
                }
                button {
                    style: BUTTON_STYLE,
                    disabled: !controls.clear_enabled,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let svc = svc.clone();
                            spawn(async move {
                                if svc.config().confirm_destructive_actions
                                    && !dialogs::confirm("Remove all files from the list?").await
                                {
                                    return;
                                }
                                if let Err(e) = svc.queue().clear().await {
                                    dialogs::show_error(humanize_error(&e)).await;
                                }
                            });
                        }
                    },
                    "Clear"
                }
            }

            if let Some(ref summary) = state.read().last_run {
                p { style: "color: #666; font-size: 14px; margin-top: 16px;",
                    if summary.stopped_early { "Stopped. " } else { "Done. " }
                    "Printed {summary.printed}, failed {summary.failed} on {summary.printer}."
                }
            }
        }
    }
}

#[component]
fn FileRow(index: usize, name: String, selected: bool, status: ItemStatus) -> Element {
    let svc = use_context::<AppServices>();
    let color = match status {
        ItemStatus::Printed => "#155724",
        ItemStatus::Failed => "#721c24",
        ItemStatus::Printing => "#007aff",
        ItemStatus::Pending => "#333",
    };

    rsx! {
        tr { style: "border-bottom: 1px solid #f0f0f0;",
            td {
                input {
                    r#type: "checkbox",
                    checked: selected,
                    onchange: move |evt| {
                        let svc = svc.clone();
                        let checked = evt.checked();
                        spawn(async move {
                            if let Err(e) = svc.queue().toggle(index, checked).await {
                                tracing::warn!(index, error = %e, "toggle failed");
                            }
                        });
                    },
                }
            }
            td { "{name}" }
            td { style: "color: {color};", "{status.label()}" }
        }
    }
}

/// Filesystem paths from a drop, in drop order.
///
/// Entries without a path (content dragged from another app rather than a
/// file) are skipped; non-PDFs are left for the queue to reject.
fn dropped_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Native multi-file picker limited to PDFs.
fn pick_pdfs() -> Option<Vec<PathBuf>> {
    rfd::FileDialog::new()
        .set_title("Add PDF files")
        .add_filter("PDF documents", &["pdf", "PDF"])
        .pick_files()
}
