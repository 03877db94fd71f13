//! Linkage fetcher: one logical `resolve(doctype, name)` call routed to
//! the backend method mapped for the document type.

use log::debug;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::doctype::DocType;
use super::error::LinkageError;
use super::records::{Envelope, ItemLinks, LinkGroups, ResourceList, RootItem, logically_empty};

/// Flat resolver seeding graph mode for a sales order root.
const ITEM_LINKS_METHOD: &str = "get_sales_order_item_links";

#[derive(Clone)]
pub struct LinkClient {
	base_url: String,
}

impl LinkClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
		}
	}

	/// Client talking to the origin the page was served from.
	pub fn from_window() -> Self {
		let origin = web_sys::window()
			.and_then(|w| w.location().origin().ok())
			.unwrap_or_default();
		Self::new(origin)
	}

	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LinkageError> {
		let url = format!("{}{}", self.base_url, path);
		debug!("GET {url}");

		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);

		let request = Request::new_with_str_and_init(&url, &opts)
			.map_err(|e| LinkageError::Transport(format!("{e:?}")))?;

		let window =
			web_sys::window().ok_or_else(|| LinkageError::Transport("no window".into()))?;
		let resp_value = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(|e| LinkageError::Transport(format!("{e:?}")))?;

		let resp: Response = resp_value
			.dyn_into()
			.map_err(|_| LinkageError::Transport("response is not a Response".into()))?;
		if !resp.ok() {
			return Err(LinkageError::Transport(format!("HTTP {}", resp.status())));
		}

		let json = JsFuture::from(
			resp.json()
				.map_err(|e| LinkageError::MalformedResponse(format!("{e:?}")))?,
		)
		.await
		.map_err(|e| LinkageError::MalformedResponse(format!("{e:?}")))?;

		serde_wasm_bindgen::from_value(json)
			.map_err(|e| LinkageError::MalformedResponse(e.to_string()))
	}

	fn method_path(method: &str, document_name: &str) -> String {
		format!(
			"/api/method/{method}?document_name={}",
			String::from(js_sys::encode_uri_component(document_name))
		)
	}

	/// Resolve a document's linkage in the grouped tree shape.
	///
	/// Unsupported types short-circuit before any request is built, and
	/// empty or all-empty responses come back as errors so the caller
	/// has nothing to special-case.
	pub async fn fetch_links(
		&self,
		doctype: &DocType,
		document_name: &str,
	) -> Result<LinkGroups, LinkageError> {
		if document_name.trim().is_empty() {
			return Err(LinkageError::MissingInput);
		}
		let Some(method) = doctype.resolver() else {
			return Err(LinkageError::UnsupportedDocumentType(
				doctype.label().to_string(),
			));
		};

		let groups: LinkGroups = self
			.get_json::<Envelope<LinkGroups>>(&Self::method_path(method, document_name))
			.await?
			.message
			.unwrap_or_default();

		if groups.is_empty() {
			return Err(LinkageError::EmptyResult);
		}
		if logically_empty(&groups) {
			return Err(LinkageError::NoConnections);
		}
		Ok(groups)
	}

	/// Resolve a sales order's items with their full chains inlined
	/// (graph-mode seed).
	pub async fn fetch_item_links(
		&self,
		document_name: &str,
	) -> Result<Vec<RootItem>, LinkageError> {
		if document_name.trim().is_empty() {
			return Err(LinkageError::MissingInput);
		}

		let items = self
			.get_json::<Envelope<ItemLinks>>(&Self::method_path(ITEM_LINKS_METHOD, document_name))
			.await?
			.message
			.map(|m| m.items)
			.unwrap_or_default();

		if items.is_empty() {
			return Err(LinkageError::EmptyResult);
		}
		Ok(items)
	}

	/// Submitted documents of a type, for the dependent name picker.
	pub async fn list_documents(&self, doctype_label: &str) -> Result<Vec<String>, LinkageError> {
		let filters = serde_json::json!([["docstatus", "=", 1]]).to_string();
		let path = format!(
			"/api/resource/{}?filters={}&limit_page_length=0",
			String::from(js_sys::encode_uri_component(doctype_label)),
			String::from(js_sys::encode_uri_component(&filters)),
		);

		let list: ResourceList = self.get_json(&path).await?;
		Ok(list.data.into_iter().map(|d| d.name).collect())
	}
}
