pub fn escape_selector(selector: &str) -> String {
    selector.replace('\\', "\\\\").replace('\'', "\\'")
}

pub const INNER_HEIGHT: &str = "window.innerHeight || document.documentElement.clientHeight";

/// True when the first match is rendered: not display:none / hidden /
/// fully transparent and has a nonzero box. False when nothing matches.
pub fn visibility_check(selector: &str) -> String {
    let escaped = escape_selector(selector);
    format!(
        r#"(function(){{const el=document.querySelector('{}');if(!el)return false;const style=window.getComputedStyle(el);const rect=el.getBoundingClientRect();return style.display!=='none'&&style.visibility!=='hidden'&&parseFloat(style.opacity||'1')>0&&rect.width>0&&rect.height>0}})()"#,
        escaped
    )
}

/// Click the first visible and enabled match, reporting what was clicked.
pub fn click_first_visible(selector: &str) -> String {
    let escaped = escape_selector(selector);
    format!(
        r#"(function(){{const els=Array.from(document.querySelectorAll('{}'));for(const el of els){{const style=window.getComputedStyle(el);const rect=el.getBoundingClientRect();const visible=style.display!=='none'&&style.visibility!=='hidden'&&parseFloat(style.opacity||'1')>0&&rect.width>0&&rect.height>0;const enabled=!el.disabled&&el.getAttribute('aria-disabled')!=='true';if(visible&&enabled){{el.click();return{{clicked:true,tag:el.tagName.toLowerCase(),aria:el.getAttribute('aria-label'),cls:el.getAttribute('class')}}}}}}return{{clicked:false}}}})()"#,
        escaped
    )
}

pub fn scroll_by(pixels: i64) -> String {
    format!("window.scrollBy(0, {});", pixels)
}

pub fn scroll_into_view(selector: &str) -> String {
    let escaped = escape_selector(selector);
    format!(
        r#"(function(){{const el=document.querySelector('{}');if(!el)return{{found:false}};el.scrollIntoView({{block:'center'}});return{{found:true}}}})()"#,
        escaped
    )
}

/// Bounding box of the first match relative to the viewport. The
/// containment decision is made by the caller, not in page context.
pub fn bounding_rect(selector: &str) -> String {
    let escaped = escape_selector(selector);
    format!(
        r#"(function(){{const el=document.querySelector('{}');if(!el)return{{found:false}};const r=el.getBoundingClientRect();return{{found:true,top:r.top,bottom:r.bottom,viewportHeight:window.innerHeight||document.documentElement.clientHeight}}}})()"#,
        escaped
    )
}

pub fn force_hide(selector: &str) -> String {
    let escaped = escape_selector(selector);
    format!(
        r#"(function(){{const el=document.querySelector('{}');if(!el)return{{hidden:false}};el.style.display='none';return{{hidden:true}}}})()"#,
        escaped
    )
}
