// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page — persistent app configuration.

use dioxus::prelude::*;

use crate::services::app_services::AppServices;

#[component]
pub fn Settings() -> Element {
    let svc = use_context::<AppServices>();
    let mut config = use_signal(|| svc.config());
    let mut save_msg = use_signal(|| Option::<String>::None);

    rsx! {
        div {
            h1 { "Settings" }

            section { style: "margin: 16px 0;",
                h3 { "List" }
                SettingRow {
                    label: "Ask before clearing or removing files",
                    checked: config.read().confirm_destructive_actions,
                    on_toggle: move |v: bool| { config.write().confirm_destructive_actions = v; },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Print System" }
                TextRow {
                    label: "Submit command",
                    value: config.read().spooler.lp_program.clone(),
                    on_change: move |v: String| { config.write().spooler.lp_program = v; },
                }
                TextRow {
                    label: "Printer list command",
                    value: config.read().spooler.lpstat_program.clone(),
                    on_change: move |v: String| { config.write().spooler.lpstat_program = v; },
                }
                TextRow {
                    label: "Printer options command",
                    value: config.read().spooler.lpoptions_program.clone(),
                    on_change: move |v: String| { config.write().spooler.lpoptions_program = v; },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Diagnostics" }
                TextRow {
                    label: "Log level",
                    value: config.read().log_level.clone(),
                    on_change: move |v: String| { config.write().log_level = v; },
                }
            }

            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px; margin-top: 8px;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let current = config.read().clone();
                        match svc.save_config(&current) {
                            Ok(()) => {
                                tracing::info!("settings saved");
                                save_msg.set(Some(
                                    "Settings saved. Print system and log changes apply after a restart.".into(),
                                ));
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "failed to save settings");
                                save_msg.set(Some(format!("Save failed: {e}")));
                            }
                        }
                    }
                },
                "Save Settings"
            }
            if let Some(ref msg) = *save_msg.read() {
                p { style: "color: #34c759; font-size: 14px; text-align: center; margin-top: 8px;",
                    "{msg}"
                }
            }
        }
    }
}

#[component]
fn SettingRow(label: &'static str, checked: bool, on_toggle: EventHandler<bool>) -> Element {
    rsx! {
        div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
            span { "{label}" }
            input {
                r#type: "checkbox",
                checked: checked,
                onchange: move |evt| {
                    on_toggle.call(evt.checked());
                },
            }
        }
    }
}

#[component]
fn TextRow(label: &'static str, value: String, on_change: EventHandler<String>) -> Element {
    rsx! {
        div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
            span { "{label}" }
            input {
                r#type: "text",
                style: "width: 160px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                value: "{value}",
                onchange: move |evt| {
                    let v = evt.value().trim().to_string();
                    if !v.is_empty() {
                        on_change.call(v);
                    }
                },
            }
        }
    }
}
