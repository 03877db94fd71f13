//! Dependent doctype/document dropdowns seeding the traversal root.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;
use web_sys::Event;

use crate::components::notices::Notices;
use crate::linkage::client::LinkClient;
use crate::linkage::doctype::{DocType, SELECTABLE};

/// Two dependent fields: picking a document type resets and retypes the
/// name field's source before any name is accepted; picking a name
/// emits the `(type, name)` pair that seeds the traversal.
#[component]
pub fn DocPicker(
	client: LinkClient,
	#[prop(into)] on_select: Callback<(DocType, String)>,
) -> impl IntoView {
	let notices = Notices::expect();
	let doctype = RwSignal::new(String::new());
	let names = RwSignal::new(Vec::<String>::new());
	let picked = RwSignal::new(String::new());

	let list_client = client.clone();
	let on_doctype_change = move |ev: Event| {
		let value = event_target_value(&ev);
		picked.set(String::new());
		names.set(Vec::new());
		doctype.set(value.clone());
		if value.is_empty() {
			notices.info("No doctype specified");
			return;
		}

		let client = list_client.clone();
		spawn_local(async move {
			match client.list_documents(&value).await {
				Ok(list) => {
					debug!("{} submitted documents for {value}", list.len());
					let _ = names.try_set(list);
				}
				Err(err) => notices.linkage_error(&err),
			}
		});
	};

	let on_name_change = move |ev: Event| {
		let value = event_target_value(&ev);
		picked.set(value.clone());

		let doctype_value = doctype.get_untracked();
		if doctype_value.is_empty() {
			notices.info("No doctype specified");
			return;
		}
		if value.is_empty() {
			notices.info("No document name specified");
			return;
		}
		on_select.run((DocType::parse(&doctype_value), value));
	};

	view! {
		<div class="doc-picker">
			<label>
				"Select DocType"
				<select on:change=on_doctype_change prop:value=move || doctype.get()>
					<option value="">"Select DocType"</option>
					{SELECTABLE
						.iter()
						.map(|label| view! { <option value=*label>{*label}</option> })
						.collect::<Vec<_>>()}
				</select>
			</label>
			<label>
				{move || {
					let d = doctype.get();
					if d.is_empty() { "Select Document".to_string() } else { format!("Select {d}") }
				}}
				<select
					on:change=on_name_change
					prop:value=move || picked.get()
					disabled=move || names.get().is_empty()
				>
					<option value="">"Select Document"</option>
					{move || {
						names
							.get()
							.into_iter()
							.map(|name| {
								let value = name.clone();
								view! { <option value=value>{name}</option> }
							})
							.collect::<Vec<_>>()
					}}
				</select>
			</label>
		</div>
	}
}
