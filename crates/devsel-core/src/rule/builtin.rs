// ── Stock device selector rules ──
//
// The attributes a device selector button needs: whether it is
// clickable, its CSS class, the WiFi signal image, the tooltip, and
// the WiFi IP address shown next to it.

use std::sync::{Arc, LazyLock};

use super::{Node, RuleRegistry, RuleSpec, Subject};
use crate::state::{CONNECTION_LINK, Root};

/// Attribute keys written by the built-in rules.
pub mod attr {
    pub const BUTTON_STATE: &str = "button_state";
    pub const BUTTON_IMAGE: &str = "button_image";
    pub const BUTTON_CLASS: &str = "button_class";
    pub const BUTTON_TITLE: &str = "button_title";
    pub const WIFI_IP_ADDRESS: &str = "displayWifiIPAddress";
}

pub const IMAGE_UNPOWERED: &str = r#"<img title="WiFi Module Unpowered" class="wifiRSSIImage" src="static/img/wifiRSSI-not-active.png">"#;
pub const IMAGE_ASSOCIATED: &str = r#"<img title="Signal Strength is {{ device.wifiRSSIStr }}" class="wifiRSSIImage" src="static/img/{{ device.wifiRSSIImgName }}.png">"#;
pub const IMAGE_UNKNOWN: &str = r#"<img title="WiFi Module {{ device.wifiStatusStr }}" class="wifiRSSIImage" src="static/img/wifiRSSI-unknown.png">"#;

static BUILTIN: LazyLock<Arc<RuleRegistry>> = LazyLock::new(|| Arc::new(build()));

/// The process-wide built-in registry, built on first use.
pub fn registry() -> &'static RuleRegistry {
    &BUILTIN
}

/// Shared handle to the built-in registry.
pub fn shared() -> Arc<RuleRegistry> {
    Arc::clone(&BUILTIN)
}

/// Build a fresh copy of the built-in rules.
pub fn build() -> RuleRegistry {
    [
        already_open_state(),
        enabled_state(),
        wifi_image(),
        button_class(),
        wifi_ip_address(),
        button_title(),
    ]
    .into_iter()
    .collect()
}

fn linked(attr: &str) -> Subject {
    Subject::nested(CONNECTION_LINK, attr)
}

/// An already-open connection cannot be opened again.
fn already_open_state() -> RuleSpec {
    RuleSpec::new(
        attr::BUTTON_STATE,
        Root::Connection,
        Node::branch(linked("alreadyOpen"), "disabled", ""),
    )
    .reading(Root::Device)
}

fn enabled_state() -> RuleSpec {
    RuleSpec::new(
        attr::BUTTON_STATE,
        Root::Connection,
        Node::branch("isEnabled", "", "disabled"),
    )
}

/// Only the T7-Pro carries a WiFi module.
fn wifi_image() -> RuleSpec {
    let by_status = Node::lookup(
        "wifiStatusStr",
        [
            ("Un-Powered", IMAGE_UNPOWERED),
            ("Associated", IMAGE_ASSOCIATED),
        ],
        IMAGE_UNKNOWN,
    );
    let by_variant = Node::lookup("specialText", [(" Pro", by_status)], "");
    RuleSpec::new(
        attr::BUTTON_IMAGE,
        Root::Device,
        Node::lookup("typeStr", [("T7", by_variant)], ""),
    )
}

fn button_class() -> RuleSpec {
    RuleSpec::new(
        attr::BUTTON_CLASS,
        Root::Connection,
        Node::branch(
            "isEnabled",
            Node::branch(
                "alreadyOpen",
                "",
                Node::branch("notSearchableWarning", "btn-warning", "btn-success"),
            ),
            "",
        ),
    )
}

fn wifi_ip_address() -> RuleSpec {
    RuleSpec::new(
        attr::WIFI_IP_ADDRESS,
        Root::Device,
        Node::branch("wifiStatus", "{{ device.wifiIPAddress }}", "0.0.0.0"),
    )
}

fn button_title() -> RuleSpec {
    let connected = Node::branch(
        linked("alreadyOpen"),
        "Unable to connect to {{ device.deviceType }}{{ device.specialText }} via {{ current.typeStr }}",
        Node::branch(
            linked("notSearchableWarning"),
            "Connect to {{ device.deviceType }}{{ device.specialText }} using {{ current.typeStr }} however, scan failed",
            "Connect to {{ device.deviceType }}{{ device.specialText }} using {{ current.typeStr }}",
        ),
    );
    RuleSpec::new(
        attr::BUTTON_TITLE,
        Root::Connection,
        Node::branch(
            "wifiStatus",
            connected,
            "Unable to connect to {{ device.deviceType }}{{ device.specialText }} via WiFi because WiFi module is unpowered",
        ),
    )
    .reading(Root::Device)
}
