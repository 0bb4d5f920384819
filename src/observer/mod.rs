pub mod agent;
pub mod dom;
pub mod navigation;
pub mod page;
pub mod selector;

pub use agent::{ClickEvent, ObserverAgent, ObserverHandle, PageEvent};
pub use dom::Element;
pub use navigation::History;
pub use page::PageContext;
pub use selector::element_selector;
