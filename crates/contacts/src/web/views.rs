//! HTML rendering for the contact pages.
//!
//! Every page is the shell (sidebar + detail outlet) with one view rendered
//! into the outlet. Rendering is pure: views take records and return markup.

use std::borrow::Cow;
use std::fmt::Write;

use url::form_urlencoded;

use crate::contact::{Contact, ContactId};

const DELETE_CONFIRMATION: &str = "Please confirm you want to delete this record.";

/// Page behavior: live search and loading indicators.
///
/// Each keystroke fetches `/?q=...` and swaps in the new list and outlet.
/// The first search of a page pushes a history entry, later ones replace
/// it, so Back leaves the search instead of stepping through every letter.
/// Only the latest search may update the page.
const PAGE_SCRIPT: &str = r"
var searchSeq = 0;
function submitSearch(form) {
  var seq = ++searchSeq;
  var input = document.getElementById('q');
  var spinner = document.getElementById('search-spinner');
  var url = '/?' + new URLSearchParams(new FormData(form)).toString();
  var first = !new URLSearchParams(location.search).has('q');
  input.classList.add('loading');
  spinner.hidden = false;
  fetch(url)
    .then(function (res) { return res.text(); })
    .then(function (text) {
      if (seq !== searchSeq) return;
      var next = new DOMParser().parseFromString(text, 'text/html');
      document.querySelector('#sidebar nav').replaceWith(next.querySelector('#sidebar nav'));
      document.getElementById('detail').replaceWith(next.getElementById('detail'));
      if (first) {
        history.pushState(null, '', url);
      } else {
        history.replaceState(null, '', url);
      }
    })
    .finally(function () {
      if (seq !== searchSeq) return;
      input.classList.remove('loading');
      spinner.hidden = true;
    });
}
window.addEventListener('popstate', function () { location.reload(); });
document.addEventListener('click', function (event) {
  var link = event.target.closest('#sidebar nav a');
  if (link) {
    link.classList.add('pending');
    document.getElementById('detail').classList.add('loading');
  }
});
window.addEventListener('pageshow', function () {
  document.getElementById('detail').classList.remove('loading');
  document.querySelectorAll('#sidebar nav a.pending').forEach(function (a) {
    a.classList.remove('pending');
  });
});
";

/// Escape text for use in element content and double-quoted attributes.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Sidebar contents: the filtered list and the search that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Sidebar<'a> {
    /// Contacts to list, already filtered and ordered by the store.
    pub contacts: &'a [Contact],
    /// Current search query, echoed into the search field.
    pub query: Option<&'a str>,
    /// Contact shown in the outlet, highlighted in the list.
    pub active: Option<ContactId>,
}

/// Path of a contact's page, keeping the current search applied.
#[must_use]
pub fn contact_url(id: ContactId, suffix: &str, query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => {
            let encoded: String = form_urlencoded::byte_serialize(q.as_bytes()).collect();
            format!("/contacts/{id}{suffix}?q={encoded}")
        }
        None => format!("/contacts/{id}{suffix}"),
    }
}

/// Render a full page: document head, sidebar, and `outlet` in the detail pane.
#[must_use]
pub fn page(title: &str, sidebar: &Sidebar<'_>, outlet: &str) -> String {
    let title = escape(title);
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str("<link rel=\"stylesheet\" href=\"/app.css\">\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<div id=\"sidebar\">\n");
    let _ = writeln!(html, "<h1>{title}</h1>");
    html.push_str("<div>\n");
    render_search(&mut html, sidebar.query);
    html.push_str(
        "<form method=\"post\" action=\"/\">\n<button type=\"submit\">New</button>\n</form>\n",
    );
    html.push_str("</div>\n");
    render_contact_list(&mut html, sidebar);
    html.push_str("</div>\n");

    let _ = writeln!(html, "<div id=\"detail\">\n{outlet}\n</div>");
    let _ = writeln!(html, "<script>{PAGE_SCRIPT}</script>");
    html.push_str("</body>\n</html>\n");
    html
}

fn render_search(html: &mut String, query: Option<&str>) {
    let value = escape(query.unwrap_or_default());
    html.push_str(
        "<form id=\"search-form\" role=\"search\" method=\"get\" action=\"/\" \
         onsubmit=\"document.getElementById('q').classList.add('loading'); \
         document.getElementById('search-spinner').hidden = false;\">\n",
    );
    let _ = writeln!(
        html,
        "<input id=\"q\" aria-label=\"Search contacts\" placeholder=\"Search\" \
         type=\"search\" name=\"q\" value=\"{value}\" oninput=\"submitSearch(this.form)\">"
    );
    html.push_str("<div id=\"search-spinner\" aria-hidden=\"true\" hidden></div>\n");
    html.push_str("</form>\n");
}

fn render_contact_list(html: &mut String, sidebar: &Sidebar<'_>) {
    html.push_str("<nav>\n");
    if sidebar.contacts.is_empty() {
        html.push_str("<p><i>No contacts</i></p>\n");
        html.push_str("</nav>\n");
        return;
    }

    html.push_str("<ul>\n");
    for contact in sidebar.contacts {
        let class = if sidebar.active == Some(contact.id) {
            " class=\"active\""
        } else {
            ""
        };
        let href = escape(&contact_url(contact.id, "", sidebar.query)).into_owned();
        let _ = write!(html, "<li><a href=\"{href}\"{class}>{}", name_markup(contact));
        if contact.favorite {
            html.push_str(" <span>★</span>");
        }
        html.push_str("</a></li>\n");
    }
    html.push_str("</ul>\n</nav>\n");
}

/// "First Last", or an italic "No Name" placeholder.
fn name_markup(contact: &Contact) -> String {
    match contact.display_name() {
        Some(name) => escape(&name).into_owned(),
        None => "<i>No Name</i>".to_string(),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Landing content shown when no contact is selected.
#[must_use]
pub fn index_page() -> String {
    "<p id=\"index-page\">\nThis is a small contact manager.\n<br>\n\
     Pick a contact from the list or press <b>New</b> to add one.\n</p>"
        .to_string()
}

/// Read-only view of one contact with its favorite, edit and delete controls.
///
/// `query` is the sidebar search, carried through every control so it
/// survives the round trip.
#[must_use]
pub fn contact_detail(contact: &Contact, query: Option<&str>) -> String {
    let id = contact.id;
    let mut html = String::with_capacity(1024);

    html.push_str("<div id=\"contact\">\n<div>\n");
    let alt = escape(&format!(
        "{} {} avatar",
        contact.first.as_deref().unwrap_or_default(),
        contact.last.as_deref().unwrap_or_default()
    ))
    .into_owned();
    match present(contact.avatar.as_deref()) {
        Some(src) => {
            let _ = writeln!(html, "<img alt=\"{alt}\" src=\"{}\">", escape(src));
        }
        None => {
            let _ = writeln!(html, "<img alt=\"{alt}\">");
        }
    }
    html.push_str("</div>\n<div>\n");

    let _ = writeln!(
        html,
        "<h1>{} {}</h1>",
        name_markup(contact),
        favorite_form(id, contact.favorite, query)
    );

    if let Some(twitter) = present(contact.twitter.as_deref()) {
        let handle = escape(twitter);
        let _ = writeln!(
            html,
            "<p><a href=\"https://twitter.com/{handle}\">{handle}</a></p>"
        );
    }

    if let Some(notes) = present(contact.notes.as_deref()) {
        let _ = writeln!(html, "<p>{}</p>", escape(notes));
    }

    html.push_str("<div>\n");
    let _ = writeln!(
        html,
        "<form action=\"/contacts/{id}/edit\" method=\"get\">{}\
         <button type=\"submit\">Edit</button></form>",
        hidden_query(query)
    );
    let _ = writeln!(
        html,
        "<form action=\"/contacts/{id}/destroy\" method=\"post\" \
         onsubmit=\"return confirm('{DELETE_CONFIRMATION}');\">\
         <button type=\"submit\">Delete</button></form>"
    );
    html.push_str("</div>\n</div>\n</div>");
    html
}

/// GET forms drop the query string of their action, so the search rides
/// along as a hidden field.
fn hidden_query(query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("<input type=\"hidden\" name=\"q\" value=\"{}\">", escape(q)),
        None => String::new(),
    }
}

/// Label and glyph for the favorite toggle in a given state.
fn favorite_face(favorite: bool) -> (&'static str, &'static str) {
    if favorite {
        ("Remove from favorites", "★")
    } else {
        ("Add to favorites", "☆")
    }
}

/// Favorite toggle. The button submits the opposite of the displayed value
/// and flips itself as soon as the form is submitted.
#[must_use]
pub fn favorite_form(id: ContactId, favorite: bool, query: Option<&str>) -> String {
    let action = escape(&contact_url(id, "", query)).into_owned();
    let (label, glyph) = favorite_face(favorite);
    let next = !favorite;
    let (next_label, next_glyph) = favorite_face(next);
    format!(
        "<form method=\"post\" action=\"{action}\" \
         onsubmit=\"var b = this.querySelector('button'); \
         b.textContent = '{next_glyph}'; b.setAttribute('aria-label', '{next_label}');\">\
         <button name=\"favorite\" value=\"{next}\" aria-label=\"{label}\">{glyph}</button>\
         </form>"
    )
}

/// Edit form pre-filled with the contact's current values.
#[must_use]
pub fn edit_form(contact: &Contact, query: Option<&str>) -> String {
    let action = escape(&contact_url(contact.id, "/edit", query)).into_owned();
    let value = |field: &Option<String>| escape(field.as_deref().unwrap_or_default()).into_owned();
    let mut html = String::with_capacity(1024);

    let _ = writeln!(
        html,
        "<form id=\"contact-form\" method=\"post\" action=\"{action}\">"
    );
    html.push_str("<p>\n<span>Name</span>\n");
    let _ = writeln!(
        html,
        "<input aria-label=\"First name\" name=\"first\" type=\"text\" placeholder=\"First\" value=\"{}\">",
        value(&contact.first)
    );
    let _ = writeln!(
        html,
        "<input aria-label=\"Last name\" name=\"last\" type=\"text\" placeholder=\"Last\" value=\"{}\">",
        value(&contact.last)
    );
    html.push_str("</p>\n");
    let _ = writeln!(
        html,
        "<label>\n<span>Twitter</span>\n\
         <input name=\"twitter\" placeholder=\"@jack\" type=\"text\" value=\"{}\">\n</label>",
        value(&contact.twitter)
    );
    let _ = writeln!(
        html,
        "<label>\n<span>Avatar URL</span>\n\
         <input name=\"avatar\" placeholder=\"https://example.com/avatar.jpg\" type=\"text\" value=\"{}\">\n</label>",
        value(&contact.avatar)
    );
    let _ = writeln!(
        html,
        "<label>\n<span>Notes</span>\n<textarea name=\"notes\" rows=\"6\">{}</textarea>\n</label>",
        value(&contact.notes)
    );
    html.push_str(
        "<p>\n<button type=\"submit\">Save</button>\n\
         <button type=\"button\" onclick=\"history.back()\">Cancel</button>\n</p>\n</form>",
    );
    html
}
