use agora_client::view::{Form, InputKind, Node};
use yew::{html::Scope, prelude::*};

use crate::ui::{App, AppMsg};

/// Turns a rendered screen into DOM nodes. Input values come from `form`, and
/// every edit is sent back as an [`AppMsg::FieldChanged`].
pub fn to_html(node: &Node, form: &Form, link: &Scope<App>) -> Html {
    match node {
        Node::Group {
            class,
            indent,
            children,
        } => {
            let style = (*indent > 0).then(|| format!("margin-left: {}em", indent * 2));
            html! {
                <div class={ classes!(*class) } style={ style }>
                    { for children.iter().map(|c| to_html(c, form, link)) }
                </div>
            }
        }
        Node::Heading { level: 1, text } => html! { <h1>{ text.clone() }</h1> },
        Node::Heading { level: 2, text } => html! { <h2>{ text.clone() }</h2> },
        Node::Heading { text, .. } => html! { <h3>{ text.clone() }</h3> },
        Node::Text { class, text } => html! { <p class={ classes!(*class) }>{ text.clone() }</p> },
        Node::Image { src, alt } => html! { <img class="avatar" src={ src.clone() } alt={ alt.clone() } /> },
        Node::Input { field, label, kind } => {
            let field = *field;
            let ty = match kind {
                InputKind::Text => "text",
                InputKind::Email => "email",
                InputKind::Password => "password",
            };
            html! {
                <div class="input-group mb-3">
                    <label class="input-group-text" for={ field.key() }>{ *label }</label>
                    <input
                        type={ ty }
                        class="form-control"
                        id={ field.key() }
                        value={ form.text(field).to_string() }
                        oninput={ link.callback(move |e: InputEvent| {
                            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                            AppMsg::FieldChanged(field, input.value())
                        }) }
                    />
                </div>
            }
        }
        Node::Checkbox { field, label } => {
            let field = *field;
            html! {
                <div class="form-check mb-3">
                    <input
                        type="checkbox"
                        class="form-check-input"
                        id={ field.key() }
                        checked={ form.flag(field) }
                        onchange={ link.callback(move |e: Event| {
                            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                            AppMsg::FieldChanged(field, input.checked().to_string())
                        }) }
                    />
                    <label class="form-check-label" for={ field.key() }>{ *label }</label>
                </div>
            }
        }
        Node::Select {
            field,
            label,
            options,
        } => {
            let field = *field;
            let current = form.text(field);
            html! {
                <div class="input-group mb-3">
                    <label class="input-group-text" for={ field.key() }>{ *label }</label>
                    <select
                        class="form-select"
                        id={ field.key() }
                        onchange={ link.callback(move |e: Event| {
                            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                            AppMsg::FieldChanged(field, select.value())
                        }) }
                    >
                        { for options.iter().map(|(value, text)| html! {
                            <option value={ *value } selected={ current == *value }>{ *text }</option>
                        }) }
                    </select>
                </div>
            }
        }
        Node::TextArea { field, placeholder } => {
            let field = *field;
            html! {
                <textarea
                    class="form-control mb-2"
                    id={ field.key() }
                    placeholder={ *placeholder }
                    value={ form.text(field).to_string() }
                    oninput={ link.callback(move |e: InputEvent| {
                        let area: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
                        AppMsg::FieldChanged(field, area.value())
                    }) }
                />
            }
        }
        Node::Button {
            label,
            action,
            enabled,
        } => {
            let action = *action;
            html! {
                <button
                    type="button"
                    class="btn btn-primary me-2"
                    disabled={ !enabled }
                    onclick={ link.callback(move |_| AppMsg::Dispatch(action)) }
                >
                    { *label }
                </button>
            }
        }
        Node::Link { text, action } => {
            let action = *action;
            html! {
                <a
                    href="#"
                    onclick={ link.callback(move |e: MouseEvent| {
                        e.prevent_default();
                        AppMsg::Dispatch(action)
                    }) }
                >
                    { text.clone() }
                </a>
            }
        }
    }
}
