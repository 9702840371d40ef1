//! CSS selectors for marketplace product pages.
//!
//! Kept apart from the inference code because the host markup changes
//! without notice; when a fixture stops matching, this is the file to edit.

/// Buy-box containers that hold the marketplace's own returns message.
pub const MARKETPLACE_RETURNS_CONTAINERS: &[&str] = &[
    "#shippingMessageInsideBuyBox_feature_div",
    "#freeReturns_feature_div",
];

/// Returns message inside one of the containers above.
pub const MARKETPLACE_RETURNS_CONTENT: &str = "#creturns-return-policy-content";

/// Badge and delivery-block locations, most specific first.
pub const BADGES: &[&str] = &[
    "#creturns-return-policy-message",
    "#creturns-policy-anchor-text",
    "[id*=\"freeReturns\"]",
    "[class*=\"free-returns\"]",
    "[id*=\"mir-layout-DELIVERY_BLOCK\"]",
    "#deliveryMessageMirId",
    "[data-csa-c-content-id*=\"DEXUnifiedCXPDM\"]",
    ".a-section.a-spacing-none.a-spacing-top-mini",
];

/// Elements scanned for "returnable within N days" phrasing.
pub const RETURNABLE_TEXT: &str = "span, div";

pub const PRODUCT_DETAIL_ROWS: &str =
    "#productDetails_detailBullets_sections1 tr, #prodDetails tr, .prodDetTable tr";

pub const EXPANDABLE_SECTIONS: &str =
    "[id*=\"returnPolicy\"], [id*=\"returns\"], [data-csa-c-content-id*=\"return\"]";

/// Byline and merchant blocks, in priority order.
pub const SELLER_BLOCKS: &[&str] = &[
    "#sellerProfileTriggerId",
    "[id*=\"merchant-info\"]",
    "#merchant-info",
    "[data-feature-name=\"bylineInfo\"]",
    "#tabular-buybox",
];

/// Any element on a fetched storefront page.
pub const ALL_ELEMENTS: &str = "*";

pub const ANCHORS: &str = "a[href]";

/// Present once the product details have rendered.
pub const PRODUCT_DETAILS_READY: &[&str] = &["#productTitle", "#price"];

/// Ids our own badge or widget carries once injected.
pub const INJECTED_WIDGET_IDS: &[&str] = &["#return-scout-badge", "#return-scout-widget"];

/// Where the widget goes, first match wins.
pub const INJECTION_POINTS: &[&str] = &[
    "#addToCart_feature_div",
    "#buybox",
    "#buy-now-button",
    "#productTitle",
    "#ppd",
];
