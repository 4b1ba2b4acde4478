//! Server-rendered HTML pages.

use crate::handlers::pages::{EditCountryForm, NewCountryForm};
use crate::model::Country;
use axum::http::StatusCode;
use maud::{html, Markup, DOCTYPE};

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:0 auto;padding:1rem}\
    nav a{margin-right:.75rem}table{border-collapse:collapse;width:100%}\
    td,th{border-bottom:1px solid #ddd;padding:.35rem;text-align:left}\
    .error{color:#b00020}.user{float:right}form.inline{display:inline}";

pub fn layout(title: &str, user: Option<&str>, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Country Catalog" }
                style { (STYLE) }
            }
            body {
                header {
                    nav {
                        @if let Some(name) = user {
                            a href="/" { "Countries" }
                            a href="/new_country" { "Add country" }
                            span.user {
                                "Signed in as " strong { (name) } " "
                                a href="/logout" { "Log out" }
                            }
                        } @else {
                            a href="/login" { "Log in" }
                            a href="/signup" { "Sign up" }
                        }
                    }
                }
                main {
                    h1 { (title) }
                    (body)
                }
            }
        }
    }
}

fn error_line(error: Option<&str>) -> Markup {
    html! {
        @if let Some(msg) = error {
            p.error role="alert" { (msg) }
        }
    }
}

/// Filter dropdown contents and the values currently selected.
pub struct ListView<'a> {
    pub query: Option<&'a str>,
    pub regions: &'a [String],
    pub languages: &'a [String],
    pub selected_region: Option<&'a str>,
    pub selected_language: Option<&'a str>,
}

fn country_rows(countries: &[Country]) -> Markup {
    html! {
        table {
            thead {
                tr { th { "Flag" } th { "Name" } th { "Code" } th { "Region" } th { "Capital" } th { "Population" } }
            }
            tbody {
                @for c in countries {
                    tr {
                        td {
                            @if let Some(url) = &c.flag_url {
                                img src=(url) alt=(format!("Flag of {}", c.name_common)) width="32";
                            }
                        }
                        td { a href=(format!("/countries/{}", c.cca2)) { (c.name_common) } }
                        td { (c.cca2) }
                        td { (c.region) }
                        td { (c.capital.as_deref().unwrap_or("")) }
                        td { (c.population) }
                    }
                }
            }
        }
    }
}

pub fn countries_page(user: &str, countries: &[Country], view: &ListView<'_>) -> Markup {
    let body = html! {
        form method="get" action="/" {
            input type="search" name="q" placeholder="Search by name" value=(view.query.unwrap_or(""));
            " "
            select name="region" {
                option value="" { "Any region" }
                @for r in view.regions {
                    option value=(r) selected[view.selected_region == Some(r.as_str())] { (r) }
                }
            }
            " "
            select name="language" {
                option value="" { "Any language" }
                @for l in view.languages {
                    option value=(l) selected[view.selected_language == Some(l.as_str())] { (l) }
                }
            }
            " "
            button type="submit" { "Filter" }
            " "
            a href="/" { "Reset" }
        }
        @if countries.is_empty() {
            p { "No countries match." }
        } @else {
            p { (countries.len()) " countries" }
            (country_rows(countries))
        }
    };
    layout("Countries", Some(user), body)
}

pub fn country_detail(user: &str, country: &Country, same_region: &[Country]) -> Markup {
    let body = html! {
        @if let Some(url) = &country.flag_url {
            img src=(url) alt=(format!("Flag of {}", country.name_common)) width="160";
        }
        dl {
            dt { "Official name" } dd { (country.name_official) }
            dt { "Codes" } dd { (country.cca2) @if let Some(c3) = &country.cca3 { " / " (c3) } }
            dt { "Region" } dd {
                (country.region)
                @if let Some(sub) = &country.subregion { " · " (sub) }
            }
            dt { "Capital" } dd { (country.capital.as_deref().unwrap_or("—")) }
            dt { "Population" } dd { (country.population) }
            dt { "Area" } dd {
                @match country.area {
                    Some(a) => { (a) " km²" }
                    None => { "—" }
                }
            }
            dt { "Independent" } dd {
                @match country.independent {
                    Some(true) => { "Yes" }
                    Some(false) => { "No" }
                    None => { "Unknown" }
                }
            }
            dt { "UN member" } dd { @if country.un_member { "Yes" } @else { "No" } }
            dt { "Timezones" } dd { (country.timezones.join(", ")) }
            dt { "Languages" } dd {
                @for (i, (code, name)) in country.languages.iter().enumerate() {
                    @if i > 0 { ", " }
                    (name) " (" (code) ")"
                }
            }
        }
        p {
            a href=(format!("/countries/{}/edit", country.cca2)) { "Edit" }
            " "
            form.inline method="post" action=(format!("/countries/{}/delete", country.cca2)) {
                button type="submit" { "Delete" }
            }
        }
        h2 { "Same region" }
        (country_rows(same_region))
    };
    layout(&country.name_common, Some(user), body)
}

pub fn new_country_form(user: &str, values: &NewCountryForm, error: Option<&str>) -> Markup {
    let body = html! {
        (error_line(error))
        form method="post" action="/new_country" {
            p { label { "Common name " input type="text" name="name_common" required value=(values.name_common); } }
            p { label { "Official name " input type="text" name="name_official" required value=(values.name_official); } }
            p { label { "Code (cca2) " input type="text" name="cca2" required maxlength="2" value=(values.cca2); } }
            p { label { "Capital " input type="text" name="capital" value=(values.capital.as_deref().unwrap_or("")); } }
            button type="submit" { "Create" }
        }
    };
    layout("New country", Some(user), body)
}

pub fn edit_country_form(user: &str, cca2: &str, values: &EditCountryForm, error: Option<&str>) -> Markup {
    let body = html! {
        (error_line(error))
        form method="post" action=(format!("/countries/{}/edit", cca2)) {
            p { label { "Common name " input type="text" name="name_common" required value=(values.name_common); } }
            p { label { "Official name " input type="text" name="name_official" required value=(values.name_official); } }
            p { label { "Capital " input type="text" name="capital" value=(values.capital.as_deref().unwrap_or("")); } }
            p { label { "Population " input type="number" name="population" min="0" value=(values.population.as_deref().unwrap_or("0")); } }
            button type="submit" { "Save" }
            " "
            a href=(format!("/countries/{}", cca2)) { "Cancel" }
        }
    };
    layout(&format!("Edit {}", cca2), Some(user), body)
}

pub fn login_page(error: Option<&str>) -> Markup {
    let body = html! {
        (error_line(error))
        form method="post" action="/login" {
            p { label { "Username " input type="text" name="username" required autocomplete="username"; } }
            p { label { "Password " input type="password" name="password" required autocomplete="current-password"; } }
            button type="submit" { "Log in" }
        }
        p { "No account? " a href="/signup" { "Sign up" } }
    };
    layout("Log in", None, body)
}

pub fn signup_page(error: Option<&str>) -> Markup {
    let body = html! {
        (error_line(error))
        form method="post" action="/signup" {
            p { label { "Username " input type="text" name="username" required autocomplete="username"; } }
            p { label { "Email " input type="email" name="email" required; } }
            p { label { "Password " input type="password" name="password" required autocomplete="new-password"; } }
            button type="submit" { "Sign up" }
        }
        p { "Already registered? " a href="/login" { "Log in" } }
    };
    layout("Sign up", None, body)
}

pub fn error_page(user: Option<&str>, status: StatusCode, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = html! {
        p { (message) }
        p { a href="/" { "Back to countries" } }
    };
    layout(title, user, body)
}
