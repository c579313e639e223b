use desktop_runtime::{DesktopProvider, DesktopShell};
use leptos::*;
use leptos_meta::*;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Meta name="description" content="A cozy desktop with a focus timer, ambience, and music." />

        <main class="site-root">
            <DesktopEntry />
        </main>
    }
}

#[component]
pub fn DesktopEntry() -> impl IntoView {
    let host_services = platform_host_web::build_host_services();

    view! {
        <DesktopProvider host_services=host_services>
            <DesktopShell />
        </DesktopProvider>
    }
}
