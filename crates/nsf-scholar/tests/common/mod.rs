//! Page fixtures shared by the integration tests.
#![allow(dead_code)]

use std::fmt::Write as _;

use wiremock::ResponseTemplate;

/// A 200 response with an HTML body.
pub fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8")
}

/// Author search results: one card per `(user, name, email line)`.
pub fn search_page(cards: &[(&str, &str, &str)]) -> String {
    let mut body = String::from("<html><body><div id=\"gsc_sa_ccl\">");
    for (user, name, email_line) in cards {
        let _ = write!(
            body,
            r#"<div class="gsc_1usr"><div class="gs_ai gs_scl gs_ai_chpr">
                 <a class="gs_ai_pho" href="/citations?hl=en&amp;user={user}"><span class="gs_rimg gs_pp_sm"><img></span></a>
                 <div class="gs_ai_t">
                   <h3 class="gs_ai_name"><a href="/citations?hl=en&amp;user={user}">{name}</a></h3>
                   <div class="gs_ai_aff">Some University</div>
                   <div class="gs_ai_eml">{email_line}</div>
                 </div>
               </div></div>"#
        );
    }
    body.push_str("</div></body></html>");
    body
}

/// A row of a profile's works table.
pub struct Work {
    pub key: &'static str,
    pub title: &'static str,
    pub year: Option<i32>,
    pub cited_by: Option<u64>,
}

impl Work {
    pub const fn new(key: &'static str, title: &'static str, year: i32) -> Self {
        Self { key, title, year: Some(year), cited_by: Some(3) }
    }
}

/// Detail-page link for a work of a user.
pub fn work_href(user: &str, key: &str) -> String {
    format!("/citations?view_op=view_citation&hl=en&citation_for_view={user}:{key}")
}

/// A profile page with metrics, histogram, interests and works.
pub fn profile_page(
    user: &str,
    total: &str,
    h_index: &str,
    histogram: &[(i32, u64)],
    interests: &[&str],
    works: &[Work],
    has_more: bool,
) -> String {
    let mut body = String::from("<html><body>");

    body.push_str(r#"<div id="gsc_prf_int">"#);
    for interest in interests {
        let _ = write!(body, r##"<a class="gsc_prf_inta gs_ibl" href="#">{interest}</a>"##);
    }
    body.push_str("</div>");

    let _ = write!(
        body,
        r#"<table id="gsc_rsb_st"><thead><tr><th></th><th>All</th><th>Since 2019</th></tr></thead><tbody>
             <tr><td class="gsc_rsb_sc1">Citations</td><td class="gsc_rsb_std">{total}</td><td class="gsc_rsb_std">1</td></tr>
             <tr><td class="gsc_rsb_sc1">h-index</td><td class="gsc_rsb_std">{h_index}</td><td class="gsc_rsb_std">1</td></tr>
             <tr><td class="gsc_rsb_sc1">i10-index</td><td class="gsc_rsb_std">7</td><td class="gsc_rsb_std">1</td></tr>
           </tbody></table>"#
    );

    body.push_str(r#"<div class="gsc_md_hist_w"><div class="gsc_md_hist_b">"#);
    for (year, _) in histogram {
        let _ = write!(body, r#"<span class="gsc_g_t">{year}</span>"#);
    }
    for (_, count) in histogram {
        let _ = write!(body, r##"<a href="#" class="gsc_g_a"><span class="gsc_g_al">{count}</span></a>"##);
    }
    body.push_str("</div></div>");

    body.push_str(r#"<table id="gsc_a_t"><tbody id="gsc_a_b">"#);
    for work in works {
        let href = work_href(user, work.key).replace('&', "&amp;");
        let year = work.year.map(|y| y.to_string()).unwrap_or_default();
        let cited_by = work.cited_by.map(|c| c.to_string()).unwrap_or_default();
        let _ = write!(
            body,
            r#"<tr class="gsc_a_tr">
                 <td class="gsc_a_t"><a href="{href}" class="gsc_a_at">{title}</a><div class="gs_gray">A Author</div></td>
                 <td class="gsc_a_c"><a href="https://scholar.google.com/scholar?cites=1" class="gsc_a_ac gs_ibl">{cited_by}</a></td>
                 <td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl">{year}</span></td>
               </tr>"#,
            title = work.title,
        );
    }
    body.push_str("</tbody></table>");

    let disabled = if has_more { "" } else { " disabled" };
    let _ = write!(
        body,
        r#"<button type="button" id="gsc_bpf_more" class="gs_btn_flat"{disabled}><span class="gs_lbl">Show more</span></button>"#
    );

    body.push_str("</body></html>");
    body
}

/// A publication detail page; `None` fields are left out of the page.
pub fn detail_page(
    authors: Option<&str>,
    date: Option<&str>,
    venue: Option<(&str, &str)>,
    abstract_text: Option<&str>,
    histogram: &[(i32, u64)],
) -> String {
    let field = |label: &str, value: &str| {
        format!(
            r#"<div class="gs_scl"><div class="gsc_oci_field">{label}</div><div class="gsc_oci_value">{value}</div></div>"#
        )
    };

    let mut body = String::from(r#"<html><body><div id="gsc_oci_table">"#);
    if let Some(authors) = authors {
        body.push_str(&field("Authors", authors));
    }
    if let Some(date) = date {
        body.push_str(&field("Publication date", date));
    }
    if let Some((label, venue)) = venue {
        body.push_str(&field(label, venue));
    }
    if let Some(text) = abstract_text {
        body.push_str(&field(
            "Description",
            &format!(r#"<div class="gsh_small"><div class="gsh_csp">{text}</div></div>"#),
        ));
    }

    let mut graph = String::from(r#"<div id="gsc_oci_graph_bars">"#);
    for (year, _) in histogram {
        let _ = write!(graph, r#"<span class="gsc_oci_g_t">{year}</span>"#);
    }
    for (_, count) in histogram {
        let _ = write!(
            graph,
            r##"<a href="#" class="gsc_oci_g_a"><span class="gsc_oci_g_al">{count}</span></a>"##
        );
    }
    graph.push_str("</div>");
    body.push_str(&field("Total citations", &graph));

    body.push_str("</div></body></html>");
    body
}
