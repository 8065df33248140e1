use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, signed_in: bool, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href="/static/main.css";
                script src="https://unpkg.com/htmx.org@1.9.12" defer {}
            }
            body {
                header class="flex items-center justify-between px-6 py-3 shadow" {
                    svg
                        xmlns="http://www.w3.org/2000/svg"
                        width="24"
                        height="24"
                        viewBox="0 0 24 24"
                        fill="none"
                        stroke="#524ed2"
                        stroke-width="2"
                        stroke-linecap="round"
                        stroke-linejoin="round"
                        class="icon icon-tabler icon-tabler-home"
                    {
                        path stroke="none" d="M0 0h24v24H0z" fill="none" {}
                        path d="M5 12l-2 0l9 -9l9 9l-2 0" {}
                        path d="M5 12v7a2 2 0 0 0 2 2h10a2 2 0 0 0 2 -2v-7" {}
                        path d="M9 21v-6a2 2 0 0 1 2 -2h2a2 2 0 0 1 2 2v6" {}
                    }
                    h3 { "SF COPA Dashboard" }
                    nav {
                        ul {
                            @if signed_in {
                                li { a href="/dashboard" { "Dashboard" } }
                            }
                        }
                    }

                    div class="inline" {
                        a
                            href="https://docs.google.com/forms/d/e/1FAIpQLSfhrgnZIeigF5WExD9N-zaueEajP-pJJLLPe-y3wFsdY4DjoA/viewform"
                            target="_blank"
                            class="text-sm text-gray-500 hover:underline"
                        { "Give Feedback" }

                        @if signed_in {
                            form action="/auth/logout" method="post" style="display: inline; margin-left: 1rem;" {
                                button type="submit" class="logout" { "Logout" }
                            }
                        } @else {
                            a href="/login" class="text-base font-medium hover:text-blue-600" style="margin-left: 1rem;" { "Login" }
                        }
                    }
                }
                (content)
            }
        }
    }
}
