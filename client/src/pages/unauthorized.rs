//! Static page for signed-in users who lack the role a route requires.

use leptos::prelude::*;

use session::gate::SIGN_IN_PATH;

use crate::components::card::{Card, CardContent, CardFooter, CardHeader};

#[component]
pub fn UnauthorizedPage() -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center bg-gray-50">
            <Card class="w-full max-w-md text-center">
                <CardHeader>
                    <h2 class="text-2xl font-bold text-gray-900">"Acceso Denegado"</h2>
                </CardHeader>
                <CardContent>
                    <p class="text-gray-600">"No tienes permisos para acceder a esta página."</p>
                </CardContent>
                <CardFooter class="justify-center">
                    <a class="text-blue-600 hover:underline" href=SIGN_IN_PATH>"Volver a iniciar sesión"</a>
                </CardFooter>
            </Card>
        </div>
    }
}
